use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shift Swap API",
        version = "1.0.0",
        description = "Authoritative shift-swap lifecycle: propose, respond, cancel and complete swaps of shift assignments"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        // Health
        crate::handlers::health::health_check,

        // Shift swaps
        crate::handlers::shift_swaps_handler::create_shift_swap,
        crate::handlers::shift_swaps_handler::list_shift_swaps,
        crate::handlers::shift_swaps_handler::get_dashboard,
        crate::handlers::shift_swaps_handler::get_shift_swap,
        crate::handlers::shift_swaps_handler::respond_to_shift_swap,
        crate::handlers::shift_swaps_handler::cancel_shift_swap,
        crate::handlers::shift_swaps_handler::complete_shift_swap,

        // Assignments
        crate::handlers::assignments_handler::get_swappable_assignments,
    ),
    components(
        schemas(
            crate::models::ShiftSwapRequest,
            crate::models::SwapPage,
            crate::models::PageMeta,
            crate::models::SwapDashboard,
            crate::models::SwapDirection,
            crate::models::ShiftAssignment,
            crate::lifecycle::SwapStatus,
            crate::lifecycle::SwapDecision,

            // Input models
            crate::models::CreateShiftSwapInput,
            crate::models::RespondShiftSwapInput,
        )
    ),
    tags(
        (name = "health", description = "Health check"),
        (name = "shift-swaps", description = "Shift swap requests"),
        (name = "shift-assignments", description = "Assignments available for swapping"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
