use crate::store::ScheduleStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ScheduleStore>,
}
