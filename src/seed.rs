//! Sample data used by the `load-sample-data` binary.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

use crate::models::{ClassType, NewBooking, NewFitnessClass};
use crate::repository::{StudioError, StudioRepository};
use crate::timezone::{normalize_to_ist, to_studio_time};

const CLASS_COUNT: i64 = 15;
const CLASSES_PER_DAY: i64 = 3;
const TARGET_BOOKINGS: usize = 20;
const MAX_ATTEMPTS: usize = 100;

const INSTRUCTORS: [&str; 5] = [
    "Emma Thompson",
    "Michael Chen",
    "Priya Sharma",
    "David Wilson",
    "Sophie Anderson",
];

const CLIENTS: [(&str, &str); 8] = [
    ("Sarah Smith", "sarah@example.com"),
    ("John Doe", "john@example.com"),
    ("Maria Garcia", "maria@example.com"),
    ("Raj Patel", "raj@example.com"),
    ("Emma Wilson", "emma@example.com"),
    ("David Kim", "david@example.com"),
    ("Lisa Chen", "lisa@example.com"),
    ("Alex Brown", "alex@example.com"),
];

/// Name and description pairs per class type.
fn catalog(class_type: ClassType) -> &'static [(&'static str, &'static str)] {
    match class_type {
        ClassType::Yoga => &[
            (
                "Morning Yoga Flow",
                "A gentle morning yoga session to start your day with energy and mindfulness.",
            ),
            (
                "Power Yoga Session",
                "An intense power yoga session focusing on strength and flexibility.",
            ),
            (
                "Yin Yoga Practice",
                "A calming yin yoga practice for deep stretching and relaxation.",
            ),
            (
                "Vinyasa Flow",
                "A dynamic vinyasa flow class connecting breath with movement.",
            ),
            (
                "Meditation & Yoga",
                "A peaceful meditation and yoga session for mental clarity.",
            ),
        ],
        ClassType::Zumba => &[
            (
                "Latin Dance Party",
                "An energetic Latin dance party that burns calories while having fun.",
            ),
            (
                "Zumba Fitness",
                "A high-energy Zumba class combining dance and fitness.",
            ),
            (
                "Dance Cardio",
                "A cardio-focused dance workout to upbeat music.",
            ),
            (
                "Zumba Toning",
                "A Zumba class incorporating light weights for toning.",
            ),
            ("Aqua Zumba", "A refreshing pool-based Zumba workout."),
        ],
        ClassType::Hiit => &[
            (
                "High Intensity Training",
                "A challenging high-intensity interval training session.",
            ),
            (
                "Tabata Workout",
                "A fast-paced Tabata workout with 20/10 intervals.",
            ),
            ("Circuit Training", "A full-body circuit training session."),
            (
                "Strength & Cardio",
                "A combination of strength training and cardio exercises.",
            ),
            (
                "Full Body HIIT",
                "An intense full-body HIIT workout for maximum calorie burn.",
            ),
        ],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub classes: i64,
    pub bookings: i64,
}

/// Wipes the store, then creates sample classes starting today at 08:00 IST
/// and books random sample clients into them through the regular booking path.
pub async fn load_sample_data<R: Rng + ?Sized>(
    repository: &dyn StudioRepository,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<SeedSummary, StudioError> {
    repository.clear().await?;

    let base = to_studio_time(now)
        .date_naive()
        .and_time(NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN));

    let mut class_ids = Vec::with_capacity(CLASS_COUNT as usize);
    for i in 0..CLASS_COUNT {
        let start = base
            + Duration::days(i / CLASSES_PER_DAY)
            + Duration::hours(i % CLASSES_PER_DAY * 2);
        let class_type = *ClassType::ALL.choose(rng).unwrap_or(&ClassType::Yoga);
        let (name, description) = catalog(class_type)[rng.random_range(0..5)];
        let instructor = INSTRUCTORS.choose(rng).copied().unwrap_or(INSTRUCTORS[0]);
        let total_slots = rng.random_range(10..=20);

        let class = repository
            .create_class(
                NewFitnessClass {
                    name: name.to_string(),
                    class_type,
                    description: description.to_string(),
                    instructor: instructor.to_string(),
                    start_time: normalize_to_ist(start),
                    end_time: normalize_to_ist(start + Duration::hours(1)),
                    total_slots,
                    available_slots: rng.random_range(5..=total_slots),
                },
                now,
            )
            .await?;
        class_ids.push(class.id);
    }

    let mut created = 0;
    let mut attempts = 0;
    while created < TARGET_BOOKINGS && attempts < MAX_ATTEMPTS {
        attempts += 1;
        let (Some(&fitness_class), Some(&(client_name, client_email))) =
            (class_ids.choose(rng), CLIENTS.choose(rng))
        else {
            break;
        };

        let booking = NewBooking {
            fitness_class,
            client_name: client_name.to_string(),
            client_email: client_email.to_string(),
        };
        match repository.create_booking(booking, Utc::now()).await {
            Ok(_) => created += 1,
            Err(err @ (StudioError::NoSlots | StudioError::DuplicateBooking)) => {
                debug!("Skipping sample booking for {client_email}: {err}");
            }
            Err(err) => return Err(err),
        }
    }

    Ok(SeedSummary {
        classes: repository.count_classes().await?,
        bookings: repository.count_bookings().await?,
    })
}
