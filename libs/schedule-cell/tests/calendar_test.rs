use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use schedule_cell::models::CreateWorkScheduleRequest;
use schedule_cell::services::calendar::SlotCalendarService;
use schedule_cell::services::schedule::WorkScheduleService;
use shared_models::booking::{Booking, BookingStatus};
use shared_store::ClinicStore;

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

fn instant(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

async fn seed_schedule(store: &Arc<ClinicStore>, doctor_id: Uuid, start: &str, end: &str) {
    WorkScheduleService::new(Arc::clone(store))
        .create_schedule(CreateWorkScheduleRequest {
            doctor_id,
            start_time: instant(start),
            end_time: instant(end),
        })
        .await
        .expect("schedule creation");
}

async fn seed_booking(
    store: &Arc<ClinicStore>,
    doctor_id: Uuid,
    on: &str,
    at: &str,
    status: BookingStatus,
) -> Booking {
    let now = Utc::now();
    store
        .insert_booking(Booking {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            doctor_id,
            service_id: Uuid::new_v4(),
            date: date(on),
            time: time(at),
            notes: None,
            status,
            price: 500_000,
            created_at: now,
            updated_at: now,
        })
        .await
}

#[tokio::test]
async fn one_hour_window_yields_two_aligned_slots() {
    let store = Arc::new(ClinicStore::new());
    let doctor_id = Uuid::new_v4();
    seed_schedule(&store, doctor_id, "2024-07-01T09:00:00Z", "2024-07-01T10:00:00Z").await;

    let calendar = SlotCalendarService::new(Arc::clone(&store));
    let slots = calendar
        .list_available_slots(doctor_id, date("2024-07-01"), date("2024-07-01"))
        .await;

    let times: Vec<(NaiveTime, NaiveTime)> =
        slots.iter().map(|s| (s.start_time, s.end_time)).collect();
    assert_eq!(
        times,
        vec![
            (time("09:00"), time("09:30")),
            (time("09:30"), time("10:00")),
        ]
    );
    assert!(slots.iter().all(|s| s.date == date("2024-07-01")));
}

#[tokio::test]
async fn window_shorter_than_one_slot_yields_nothing() {
    let store = Arc::new(ClinicStore::new());
    let doctor_id = Uuid::new_v4();
    seed_schedule(&store, doctor_id, "2024-07-01T09:00:00Z", "2024-07-01T09:20:00Z").await;

    let calendar = SlotCalendarService::new(Arc::clone(&store));
    let slots = calendar
        .list_available_slots(doctor_id, date("2024-07-01"), date("2024-07-01"))
        .await;

    assert!(slots.is_empty());
}

#[tokio::test]
async fn unaligned_window_keeps_only_fully_contained_slots() {
    let store = Arc::new(ClinicStore::new());
    let doctor_id = Uuid::new_v4();
    seed_schedule(&store, doctor_id, "2024-07-01T09:15:00Z", "2024-07-01T10:15:00Z").await;

    let calendar = SlotCalendarService::new(Arc::clone(&store));
    let slots = calendar
        .list_available_slots(doctor_id, date("2024-07-01"), date("2024-07-01"))
        .await;

    let times: Vec<NaiveTime> = slots.iter().map(|s| s.start_time).collect();
    assert_eq!(times, vec![time("09:30")]);
}

#[tokio::test]
async fn adjacent_windows_produce_continuous_slots() {
    let store = Arc::new(ClinicStore::new());
    let doctor_id = Uuid::new_v4();
    seed_schedule(&store, doctor_id, "2024-07-01T09:00:00Z", "2024-07-01T10:00:00Z").await;
    seed_schedule(&store, doctor_id, "2024-07-01T10:00:00Z", "2024-07-01T11:00:00Z").await;

    let calendar = SlotCalendarService::new(Arc::clone(&store));
    let slots = calendar
        .list_available_slots(doctor_id, date("2024-07-01"), date("2024-07-01"))
        .await;

    let times: Vec<NaiveTime> = slots.iter().map(|s| s.start_time).collect();
    assert_eq!(
        times,
        vec![time("09:00"), time("09:30"), time("10:00"), time("10:30")]
    );
}

#[tokio::test]
async fn booked_slot_is_subtracted_until_cancelled() {
    let store = Arc::new(ClinicStore::new());
    let doctor_id = Uuid::new_v4();
    seed_schedule(&store, doctor_id, "2024-07-01T09:00:00Z", "2024-07-01T10:00:00Z").await;
    let booking = seed_booking(&store, doctor_id, "2024-07-01", "09:00", BookingStatus::Requested).await;

    let calendar = SlotCalendarService::new(Arc::clone(&store));
    let slots = calendar
        .list_available_slots(doctor_id, date("2024-07-01"), date("2024-07-01"))
        .await;
    let times: Vec<NaiveTime> = slots.iter().map(|s| s.start_time).collect();
    assert_eq!(times, vec![time("09:30")]);

    // Cancelling the booking releases its slot.
    store
        .with_booking_mut::<(), _>(booking.id, |b| {
            b.status = BookingStatus::Cancelled;
            Ok(())
        })
        .await
        .unwrap();

    let slots = calendar
        .list_available_slots(doctor_id, date("2024-07-01"), date("2024-07-01"))
        .await;
    let times: Vec<NaiveTime> = slots.iter().map(|s| s.start_time).collect();
    assert_eq!(times, vec![time("09:00"), time("09:30")]);
}

#[tokio::test]
async fn unavailable_schedules_are_excluded() {
    let store = Arc::new(ClinicStore::new());
    let doctor_id = Uuid::new_v4();
    seed_schedule(&store, doctor_id, "2024-07-01T09:00:00Z", "2024-07-01T10:00:00Z").await;

    let schedule = store.work_schedules_for_doctor(doctor_id).await.remove(0);
    store
        .update_work_schedule(schedule.id, |s| s.is_available = false)
        .await
        .unwrap();

    let calendar = SlotCalendarService::new(Arc::clone(&store));
    let slots = calendar
        .list_available_slots(doctor_id, date("2024-07-01"), date("2024-07-01"))
        .await;
    assert!(slots.is_empty());
}

#[tokio::test]
async fn unknown_doctor_and_inverted_range_yield_empty() {
    let store = Arc::new(ClinicStore::new());
    let doctor_id = Uuid::new_v4();

    let calendar = SlotCalendarService::new(Arc::clone(&store));
    assert!(calendar
        .list_available_slots(doctor_id, date("2024-07-01"), date("2024-07-07"))
        .await
        .is_empty());

    seed_schedule(&store, doctor_id, "2024-07-01T09:00:00Z", "2024-07-01T10:00:00Z").await;
    assert!(calendar
        .list_available_slots(doctor_id, date("2024-07-07"), date("2024-07-01"))
        .await
        .is_empty());
}

#[tokio::test]
async fn multi_day_range_collects_each_day() {
    let store = Arc::new(ClinicStore::new());
    let doctor_id = Uuid::new_v4();
    seed_schedule(&store, doctor_id, "2024-07-01T09:00:00Z", "2024-07-01T10:00:00Z").await;
    seed_schedule(&store, doctor_id, "2024-07-02T13:00:00Z", "2024-07-02T14:00:00Z").await;

    let calendar = SlotCalendarService::new(Arc::clone(&store));
    let slots = calendar
        .list_available_slots(doctor_id, date("2024-07-01"), date("2024-07-03"))
        .await;

    assert_eq!(slots.len(), 4);
    assert_eq!(slots.iter().filter(|s| s.date == date("2024-07-01")).count(), 2);
    assert_eq!(slots.iter().filter(|s| s.date == date("2024-07-02")).count(), 2);
}

#[tokio::test]
async fn slot_membership_check_respects_grid_and_window() {
    let store = Arc::new(ClinicStore::new());
    let doctor_id = Uuid::new_v4();
    seed_schedule(&store, doctor_id, "2024-07-01T09:00:00Z", "2024-07-01T10:00:00Z").await;

    let calendar = SlotCalendarService::new(Arc::clone(&store));

    assert!(calendar.slot_within_schedule(doctor_id, date("2024-07-01"), time("09:30")).await);
    // Off the grid
    assert!(!calendar.slot_within_schedule(doctor_id, date("2024-07-01"), time("09:15")).await);
    // Slot would overrun the window
    assert!(!calendar.slot_within_schedule(doctor_id, date("2024-07-01"), time("10:00")).await);
    // Wrong day
    assert!(!calendar.slot_within_schedule(doctor_id, date("2024-07-02"), time("09:30")).await);
}
