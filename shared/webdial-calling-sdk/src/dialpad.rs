//! Dial pad state model
//!
//! The two visual modes (dialing vs. in-call) and the dialed-number
//! buffer, kept independent of any rendering layer.

use chrono::{DateTime, Utc};

use webdial_core::PhoneNumber;

use crate::call::CallStatus;

/// Keypad layout, row by row.
pub const DIAL_KEYS: [char; 12] = ['1', '2', '3', '4', '5', '6', '7', '8', '9', '*', '0', '#'];

/// Presentational state for the dial pad.
#[derive(Debug, Clone, Default)]
pub struct DialPad {
    phone_number: String,
    in_call: bool,
    status: Option<CallStatus>,
    call_started: Option<DateTime<Utc>>,
}

impl DialPad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn is_in_call(&self) -> bool {
        self.in_call
    }

    /// Append a keypad digit. Ignored while in a call (the keypad is
    /// hidden) or for keys that are not on the pad.
    pub fn press(&mut self, key: char) {
        if self.in_call || !DIAL_KEYS.contains(&key) {
            return;
        }
        self.phone_number.push(key);
    }

    /// Replace the number from manual input, filtering everything but
    /// digits, `+`, `*` and `#`.
    pub fn set_input(&mut self, value: &str) {
        if self.in_call {
            return;
        }
        self.phone_number = PhoneNumber::sanitize(value);
    }

    pub fn clear(&mut self) {
        self.phone_number.clear();
    }

    /// The call button is enabled only with a number and no call up.
    pub fn can_call(&self) -> bool {
        !self.phone_number.is_empty() && !self.in_call
    }

    /// Switch to in-call mode while the call connects.
    pub fn begin_call(&mut self) {
        self.in_call = true;
        self.status = Some(CallStatus::Connecting);
        self.call_started = None;
    }

    /// The established event landed; the duration clock starts now.
    pub fn mark_established(&mut self) {
        self.status = Some(CallStatus::Established);
        self.call_started = Some(Utc::now());
    }

    pub fn call_started(&self) -> Option<DateTime<Utc>> {
        self.call_started
    }

    /// Back to dialing mode after hangup or failure. The number stays.
    pub fn reset(&mut self) {
        self.in_call = false;
        self.status = None;
        self.call_started = None;
    }

    pub fn status_label(&self) -> &'static str {
        match self.status {
            Some(CallStatus::Connecting) => "Connecting...",
            Some(CallStatus::Established) => "Connected",
            Some(CallStatus::Ended) | None => "",
        }
    }

    /// Elapsed call time as `MM:SS`, ticking from the established time.
    pub fn duration_label(&self, now: DateTime<Utc>) -> String {
        match self.call_started {
            Some(started) => {
                let elapsed = (now - started).num_seconds().max(0);
                format!("{:02}:{:02}", elapsed / 60, elapsed % 60)
            }
            None => "00:00".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn presses_append_digits() {
        let mut pad = DialPad::new();
        pad.press('3');
        pad.press('8');
        pad.press('*');
        pad.press('#');
        assert_eq!(pad.phone_number(), "38*#");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut pad = DialPad::new();
        pad.press('a');
        pad.press('+');
        pad.press(' ');
        assert_eq!(pad.phone_number(), "");
    }

    #[test]
    fn manual_input_is_filtered() {
        let mut pad = DialPad::new();
        pad.set_input("+386 (40) 111-222 ext.9#");
        assert_eq!(pad.phone_number(), "+386401112229#");
    }

    #[test]
    fn clear_resets_the_number() {
        let mut pad = DialPad::new();
        pad.set_input("12345");
        pad.clear();
        assert_eq!(pad.phone_number(), "");
        assert!(!pad.can_call());
    }

    #[test]
    fn call_button_needs_a_number_and_no_call() {
        let mut pad = DialPad::new();
        assert!(!pad.can_call());

        pad.set_input("38640111222");
        assert!(pad.can_call());

        pad.begin_call();
        assert!(!pad.can_call());
    }

    #[test]
    fn keypad_is_inert_while_in_call() {
        let mut pad = DialPad::new();
        pad.set_input("123");
        pad.begin_call();

        pad.press('4');
        pad.set_input("999");
        assert_eq!(pad.phone_number(), "123");
    }

    #[test]
    fn status_labels_follow_the_call() {
        let mut pad = DialPad::new();
        assert_eq!(pad.status_label(), "");

        pad.begin_call();
        assert_eq!(pad.status_label(), "Connecting...");

        pad.mark_established();
        assert_eq!(pad.status_label(), "Connected");

        pad.reset();
        assert_eq!(pad.status_label(), "");
        assert!(!pad.is_in_call());
    }

    #[test]
    fn number_survives_hangup() {
        let mut pad = DialPad::new();
        pad.set_input("38640111222");
        pad.begin_call();
        pad.reset();
        assert_eq!(pad.phone_number(), "38640111222");
    }

    #[test]
    fn duration_formats_minutes_and_seconds() {
        let mut pad = DialPad::new();
        assert_eq!(pad.duration_label(Utc::now()), "00:00");

        pad.mark_established();
        let started = pad.call_started().expect("established call has a start time");
        assert_eq!(pad.duration_label(started + Duration::seconds(65)), "01:05");
        assert_eq!(pad.duration_label(started + Duration::seconds(600)), "10:00");
    }
}
