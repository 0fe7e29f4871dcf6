//! Onboarding domain module.
//!
//! This module defines the welcome → setup → dashboard state machine types.

pub mod state_machine;

pub use state_machine::{
    OnboardingAction, OnboardingEvent, OnboardingState, OnboardingStateMachine,
};
