//! Parameter automation timeline.
//!
//! Mirrors the Web Audio `AudioParam` model closely enough for frequency
//! glides: step changes, linear ramps that arrive at a value at a given
//! time, and cancellation of everything scheduled from a time onwards.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AutomationEvent {
    /// Jump to `value` at `time`.
    SetValue { value: f64, time: f64 },
    /// Glide linearly from the previous event's value, arriving at `value` at `time`.
    LinearRamp { value: f64, time: f64 },
}

impl AutomationEvent {
    pub fn time(&self) -> f64 {
        match *self {
            AutomationEvent::SetValue { time, .. } | AutomationEvent::LinearRamp { time, .. } => time,
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            AutomationEvent::SetValue { value, .. } | AutomationEvent::LinearRamp { value, .. } => {
                value
            }
        }
    }
}

/// Time-ordered automation events plus the value used before the first one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Automation {
    default_value: f64,
    events: Vec<AutomationEvent>,
}

impl Automation {
    pub fn new(default_value: f64) -> Self {
        Automation {
            default_value,
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[AutomationEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn set_value_at_time(&mut self, value: f64, time: f64) {
        self.insert(AutomationEvent::SetValue { value, time });
    }

    pub fn linear_ramp_to_value_at_time(&mut self, value: f64, time: f64) {
        self.insert(AutomationEvent::LinearRamp { value, time });
    }

    /// Drop every event at or after `from_time`.
    pub fn cancel_scheduled_values(&mut self, from_time: f64) {
        self.events.retain(|e| e.time() < from_time);
    }

    /// Events at equal times keep their insertion order.
    fn insert(&mut self, event: AutomationEvent) {
        let at = self.events.partition_point(|e| e.time() <= event.time());
        self.events.insert(at, event);
    }

    /// The parameter value at `time`.
    pub fn value_at(&self, time: f64) -> f64 {
        let next = self.events.partition_point(|e| e.time() <= time);

        let (from_value, from_time) = match next.checked_sub(1) {
            Some(i) => (self.events[i].value(), self.events[i].time()),
            None => (self.default_value, 0.0),
        };

        match self.events.get(next) {
            Some(&AutomationEvent::LinearRamp { value, time: to_time }) if to_time > from_time => {
                let progress = ((time - from_time) / (to_time - from_time)).clamp(0.0, 1.0);
                from_value + (value - from_value) * progress
            }
            _ => from_value,
        }
    }
}
