use icalendar::{Calendar, Component, Event, EventLike};

use crate::models::FitnessClass;

#[derive(Clone, Default)]
pub struct ICalExporter;

impl ICalExporter {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, classes: &[FitnessClass]) -> Vec<u8> {
        let mut calendar = Calendar::new();
        calendar.name("Fitness Studio Classes");

        for class in classes {
            let mut event = Event::new();
            event.summary(&format!("{}: {}", class.class_type.label(), class.name));
            event.starts(class.start_time);
            event.ends(class.end_time);
            event.description(&format!(
                "{}\nInstructor: {}\nAvailable slots: {}/{}",
                class.description, class.instructor, class.available_slots, class.total_slots
            ));
            event.uid(&format!("fitness-class-{}@fitness-studio", class.id));
            calendar.push(event);
        }

        calendar.to_string().into_bytes()
    }
}
