//! Test doubles shared by service and handler tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use mockable::Clock;
use uuid::Uuid;

use crate::core::config::ReportLinkConfig;
use crate::core::error::Result;
use crate::features::report_links::models::{CreateReportLink, ReportLink};
use crate::features::report_links::services::ReportLinkService;
use crate::features::route_reports::dtos::RouteReportFormDto;
use crate::features::route_reports::models::{
    CreateRouteReport, RouteReport, RouteReportContent, RouteStatus,
};
use crate::features::route_reports::services::SubmissionService;
use crate::modules::store::{ConsumeOutcome, ReportStore};

pub const TEST_PEPPER: &str = "test-pepper-0123456789abcdef0123456789";
pub const TEST_FRONTEND_URL: &str = "https://drivers.example.test";

/// Fixed instant all scenarios start from
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 17, 30, 0).unwrap()
}

pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock_clock() = now;
    }

    pub fn advance(&self, delta: Duration) {
        *self.lock_clock() += delta;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

#[derive(Default)]
struct MemoryTables {
    links: HashMap<Uuid, ReportLink>,
    reports: HashMap<Uuid, RouteReport>,
}

/// In-memory [`ReportStore`]. A single mutex stands in for the database's
/// row lock, so the conditional consume is atomic like its SQL counterpart.
#[derive(Default)]
pub struct InMemoryReportStore {
    tables: Mutex<MemoryTables>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, MemoryTables> {
        match self.tables.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("store mutex"),
        }
    }

    pub fn report_count(&self) -> usize {
        self.tables().reports.len()
    }

    pub fn link(&self, id: Uuid) -> Option<ReportLink> {
        self.tables().links.get(&id).cloned()
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn insert_link(&self, data: &CreateReportLink) -> Result<ReportLink> {
        let link = ReportLink {
            id: Uuid::now_v7(),
            driver_id: data.driver_id,
            company_id: data.company_id,
            hashed_token: data.hashed_token.clone(),
            expires_at: data.expires_at,
            used_at: None,
            created_at: data.created_at,
        };
        self.tables().links.insert(link.id, link.clone());
        Ok(link)
    }

    async fn find_link(&self, id: Uuid) -> Result<Option<ReportLink>> {
        Ok(self.link(id))
    }

    async fn find_link_by_hash(&self, hashed_token: &str) -> Result<Option<ReportLink>> {
        Ok(self
            .tables()
            .links
            .values()
            .find(|l| l.hashed_token == hashed_token)
            .cloned())
    }

    async fn consume_link_and_create_report(
        &self,
        link_id: Uuid,
        data: &CreateRouteReport,
    ) -> Result<ConsumeOutcome> {
        let mut tables = self.tables();
        let Some(link) = tables.links.get_mut(&link_id) else {
            return Ok(ConsumeOutcome::LinkUnavailable);
        };
        if link.used_at.is_some() || link.expires_at <= data.created_at {
            return Ok(ConsumeOutcome::LinkUnavailable);
        }
        link.used_at = Some(data.created_at);

        let content = data.content.clone();
        let report = RouteReport {
            id: Uuid::now_v7(),
            link_id,
            driver_id: data.driver_id,
            company_id: data.company_id,
            report_date: content.report_date,
            route_status: content.route_status,
            delay_minutes: content.delay_minutes,
            delay_reason: content.delay_reason,
            kilometers_driven: content.kilometers_driven,
            incident_description: content.incident_description,
            notes: content.notes,
            editable_until: data.editable_until,
            created_at: data.created_at,
            updated_at: data.created_at,
        };
        tables.reports.insert(report.id, report.clone());
        Ok(ConsumeOutcome::Created(report))
    }

    async fn find_report_with_link_hash(
        &self,
        report_id: Uuid,
    ) -> Result<Option<(RouteReport, String)>> {
        let tables = self.tables();
        Ok(tables.reports.get(&report_id).and_then(|r| {
            tables
                .links
                .get(&r.link_id)
                .map(|l| (r.clone(), l.hashed_token.clone()))
        }))
    }

    async fn update_report_within_window(
        &self,
        report_id: Uuid,
        content: &RouteReportContent,
        now: DateTime<Utc>,
    ) -> Result<Option<RouteReport>> {
        let mut tables = self.tables();
        let Some(report) = tables.reports.get_mut(&report_id) else {
            return Ok(None);
        };
        if report.editable_until <= now {
            return Ok(None);
        }
        let content = content.clone();
        report.report_date = content.report_date;
        report.route_status = content.route_status;
        report.delay_minutes = content.delay_minutes;
        report.delay_reason = content.delay_reason;
        report.kilometers_driven = content.kilometers_driven;
        report.incident_description = content.incident_description;
        report.notes = content.notes;
        report.updated_at = now;
        Ok(Some(report.clone()))
    }
}

pub fn test_link_config() -> ReportLinkConfig {
    ReportLinkConfig {
        pepper: TEST_PEPPER.to_string(),
        link_ttl: Duration::hours(24),
        edit_window: Duration::minutes(10),
        issuer_key: Some("issuer-test-key".to_string()),
    }
}

/// Services wired to one in-memory store and one mutable clock
pub struct TestServices {
    pub store: Arc<InMemoryReportStore>,
    pub clock: Arc<MutableClock>,
    pub links: Arc<ReportLinkService>,
    pub submissions: Arc<SubmissionService>,
}

pub fn test_services() -> TestServices {
    let store = Arc::new(InMemoryReportStore::new());
    let clock = Arc::new(MutableClock::new(t0()));
    let config = test_link_config();
    let links = Arc::new(ReportLinkService::new(
        store.clone(),
        clock.clone(),
        &config,
        TEST_FRONTEND_URL,
    ));
    let submissions = Arc::new(SubmissionService::new(
        store.clone(),
        Arc::clone(&links),
        clock.clone(),
        config.edit_window,
    ));
    TestServices {
        store,
        clock,
        links,
        submissions,
    }
}

/// A completed, on-time report for the day of [`t0`]
pub fn completed_form() -> RouteReportFormDto {
    RouteReportFormDto {
        report_date: t0().date_naive(),
        route_status: RouteStatus::Completed,
        delay_minutes: 0,
        delay_reason: None,
        kilometers_driven: Some(212),
        incident_description: None,
        notes: Some(Sentence(3..8).fake()),
    }
}
