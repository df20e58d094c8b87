use utoipa::OpenApi;

use crate::error::ErrorBody;
use crate::models::{BookingCreate, BookingView, ClassType, ClassView};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        crate::handlers::list_classes,
        crate::handlers::get_ical,
        crate::handlers::create_booking,
        crate::handlers::list_bookings
    ),
    components(schemas(ClassType, ClassView, BookingCreate, BookingView, ErrorBody)),
    tags(
        (name = "studio", description = "Service metadata and health"),
        (name = "classes", description = "Upcoming class catalog"),
        (name = "bookings", description = "Class bookings")
    ),
)]
pub struct ApiDoc;
