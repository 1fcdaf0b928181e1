use crate::clients::{MovieClient, ScheduleClient};
use crate::store::BookingStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<BookingStore>,
    pub schedule: ScheduleClient,
    pub movies: MovieClient,
}
