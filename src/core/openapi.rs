use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::audit_logs::{dtos as audit_logs_dtos, handlers as audit_logs_handlers};
use crate::features::auth;
use crate::features::comments::{
    dtos as comments_dtos, handlers as comments_handlers, models as comments_models,
};
use crate::features::complaints::{
    dtos as complaints_dtos, handlers as complaints_handlers, models as complaints_models,
};
use crate::features::dashboard::{dtos as dashboard_dtos, handlers as dashboard_handlers};
use crate::features::feedback::{dtos as feedback_dtos, handlers as feedback_handlers};
use crate::features::notifications::{
    dtos as notifications_dtos, handlers as notifications_handlers,
};
use crate::features::profiles::{
    dtos as profiles_dtos, handlers as profiles_handlers, models as profiles_models,
};
use crate::features::realtime::{handlers as realtime_handlers, models as realtime_models};
use crate::features::triage::{
    classifier as triage_classifier, dtos as triage_dtos, handlers as triage_handlers,
};
use crate::features::whatsapp::handlers as whatsapp_handlers;
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handler::get_session,
        // Profiles
        profiles_handlers::get_my_profile,
        profiles_handlers::update_my_profile,
        profiles_handlers::list_officials,
        profiles_handlers::list_users,
        profiles_handlers::update_user_role,
        profiles_handlers::delete_user,
        // Complaints
        complaints_handlers::create_complaint,
        complaints_handlers::list_complaints,
        complaints_handlers::list_my_complaints,
        complaints_handlers::get_complaint,
        complaints_handlers::update_complaint_status,
        complaints_handlers::assign_complaint,
        complaints_handlers::upload_complaint_images,
        // Comments
        comments_handlers::list_comments,
        comments_handlers::create_comment,
        // Feedback
        feedback_handlers::create_feedback,
        feedback_handlers::list_feedback,
        // Notifications
        notifications_handlers::list_notifications,
        notifications_handlers::mark_notification_read,
        notifications_handlers::mark_all_notifications_read,
        // Audit logs (super admin)
        audit_logs_handlers::list_audit_logs,
        // Realtime
        realtime_handlers::stream_changes,
        // Dashboard (public)
        dashboard_handlers::get_summary,
        dashboard_handlers::get_trend,
        dashboard_handlers::get_map,
        // Triage function
        triage_handlers::categorize_preflight,
        triage_handlers::categorize_complaint,
        // WhatsApp channel
        whatsapp_handlers::verify_webhook,
        whatsapp_handlers::receive_webhook,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth::model::AuthenticatedUser,
            ApiResponse<auth::model::AuthenticatedUser>,
            // Profiles
            profiles_models::UserRole,
            profiles_models::SupportedLanguage,
            profiles_dtos::ProfileResponseDto,
            profiles_dtos::UpdateProfileDto,
            profiles_dtos::UpdateRoleDto,
            ApiResponse<profiles_dtos::ProfileResponseDto>,
            ApiResponse<Vec<profiles_dtos::ProfileResponseDto>>,
            // Complaints
            complaints_models::ComplaintStatus,
            complaints_models::ComplaintPriority,
            complaints_models::ComplaintImage,
            complaints_dtos::CreateComplaintDto,
            complaints_dtos::UpdateStatusDto,
            complaints_dtos::AssignComplaintDto,
            complaints_dtos::UploadImagesDto,
            complaints_dtos::ComplaintResponseDto,
            complaints_dtos::ComplaintSortBy,
            complaints_dtos::SortDirection,
            ApiResponse<complaints_dtos::ComplaintResponseDto>,
            ApiResponse<Vec<complaints_dtos::ComplaintResponseDto>>,
            ApiResponse<Vec<complaints_models::ComplaintImage>>,
            // Comments
            comments_models::CommentAuthorType,
            comments_dtos::CreateCommentDto,
            comments_dtos::CommentResponseDto,
            ApiResponse<comments_dtos::CommentResponseDto>,
            ApiResponse<Vec<comments_dtos::CommentResponseDto>>,
            // Feedback
            feedback_dtos::CreateFeedbackDto,
            feedback_dtos::FeedbackResponseDto,
            ApiResponse<feedback_dtos::FeedbackResponseDto>,
            ApiResponse<Vec<feedback_dtos::FeedbackResponseDto>>,
            // Notifications
            notifications_dtos::NotificationResponseDto,
            notifications_dtos::MarkAllReadResponseDto,
            ApiResponse<notifications_dtos::NotificationResponseDto>,
            ApiResponse<Vec<notifications_dtos::NotificationResponseDto>>,
            ApiResponse<notifications_dtos::MarkAllReadResponseDto>,
            // Audit logs
            audit_logs_dtos::AuditLogResponseDto,
            ApiResponse<Vec<audit_logs_dtos::AuditLogResponseDto>>,
            // Realtime
            realtime_models::ChangeKind,
            realtime_models::ChangeEvent,
            // Dashboard (public)
            dashboard_dtos::DashboardSummaryDto,
            dashboard_dtos::StatusCountsDto,
            dashboard_dtos::MonthlyTrendDto,
            dashboard_dtos::MapPointDto,
            ApiResponse<dashboard_dtos::DashboardSummaryDto>,
            ApiResponse<Vec<dashboard_dtos::MonthlyTrendDto>>,
            ApiResponse<Vec<dashboard_dtos::MapPointDto>>,
            // Triage function
            triage_classifier::TriageCategory,
            triage_dtos::CategorizeRequestDto,
            triage_dtos::CategorizeResponseDto,
            triage_dtos::TriageErrorDto,
        )
    ),
    tags(
        (name = "auth", description = "Session of the verified caller"),
        (name = "profiles", description = "Profiles, officials and user management"),
        (name = "complaints", description = "Complaint submission and handling"),
        (name = "comments", description = "Complaint discussion threads"),
        (name = "feedback", description = "Citizen ratings of resolved complaints"),
        (name = "notifications", description = "Per-user notification inbox"),
        (name = "admin", description = "User management and audit trail"),
        (name = "realtime", description = "Server-Sent Events change stream"),
        (name = "Dashboard", description = "Public complaint statistics"),
        (name = "triage", description = "Complaint categorization function"),
        (name = "whatsapp", description = "WhatsApp Cloud API webhook"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Complaint Desk API",
        version = "0.1.0",
        description = "API documentation for the citizen complaint desk",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to the OpenAPI document
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
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
