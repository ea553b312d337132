use serde::Deserialize;
use utoipa::IntoParams;

use crate::features::realtime::models::ChangeKind;

/// Query params for the change stream
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct RealtimeQueryParams {
    /// Only changes to this table (e.g. `complaints`, `comments`, `notifications`)
    pub table: Option<String>,
    /// Only this kind of change
    pub event: Option<ChangeKind>,
    /// Only changes to this row or rows of this complaint
    pub record_id: Option<String>,
}
