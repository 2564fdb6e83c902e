//! Donation request lifecycle: submission, browsing, editing and the
//! organizer dashboard.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use givehub_common::{AppError, AppResult, FieldErrors, IdGenerator, collect_field_errors};
use givehub_db::{
    entities::{
        category,
        donation_request::{self, DonationType, RequestStatus, Urgency},
        organization, story, user,
    },
    repositories::{
        CategoryRepository, DonationRepository, DonationRequestRepository,
        OrganizationRepository, Paged, RequestFilter, StoryRepository, UserRepository,
    },
};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, DatabaseTransaction, Iterable, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::donation::DonationView;
use super::lifecycle::{self, Transition};
use super::progress::Progress;
use super::user::{UserSummary, require_organizer};

/// Smallest fundraising goal a money request may set.
pub const MIN_GOAL_AMOUNT: i64 = 1000;

/// Donations shown on the request detail page.
const RECENT_DONATIONS: u64 = 10;

/// Stories shown on the request detail page.
const RECENT_STORIES: u64 = 10;

/// Bank account donors transfer to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    #[serde(default)]
    pub bank: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub account_name: String,
}

impl BankAccount {
    fn is_complete(&self) -> bool {
        [&self.bank, &self.account_number, &self.account_name]
            .iter()
            .all(|part| !part.trim().is_empty())
    }
}

/// Shape of the `payment_methods` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethods {
    pub bank_account: BankAccount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promptpay_id: Option<String>,
}

/// Input for submitting a new donation request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRequestInput {
    #[validate(length(min = 1, max = 255, message = "The title must be between 1 and 255 characters."))]
    pub title: String,

    #[validate(length(min = 1, message = "The description field is required."))]
    pub description: String,

    pub category_id: i32,

    /// Any of `money`, `items`, `volunteer`.
    #[serde(default)]
    pub donation_types: Vec<String>,

    pub goal_amount: Option<Decimal>,
    pub bank_account: Option<BankAccount>,
    pub promptpay_id: Option<String>,

    pub items_needed: Option<String>,

    pub volunteers_needed: Option<i32>,
    pub volunteer_details: Option<String>,

    #[serde(default)]
    pub urgency: Urgency,

    #[validate(length(max = 255))]
    pub location: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,

    pub expires_at: Option<DateTime<Utc>>,

    /// Used only when the organizer has no organization yet.
    #[validate(length(max = 255))]
    pub organization_name: Option<String>,

    #[validate(length(max = 64))]
    pub organization_type: Option<String>,

    #[validate(length(max = 64))]
    pub registration_number: Option<String>,

    #[validate(email(message = "The organization email must be a valid email address."))]
    pub organization_email: Option<String>,

    #[validate(length(max = 32))]
    pub organization_phone: Option<String>,

    pub organization_address: Option<String>,
}

/// Input for editing a draft or rejected request. Absent fields are kept.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateRequestInput {
    #[validate(length(min = 1, max = 255, message = "The title must be between 1 and 255 characters."))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "The description field is required."))]
    pub description: Option<String>,

    pub category_id: Option<i32>,
    pub donation_types: Option<Vec<String>>,

    pub goal_amount: Option<Decimal>,
    pub bank_account: Option<BankAccount>,
    pub promptpay_id: Option<String>,

    pub items_needed: Option<String>,

    pub volunteers_needed: Option<i32>,
    pub volunteer_details: Option<String>,

    pub urgency: Option<Urgency>,

    #[validate(length(max = 255))]
    pub location: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,

    pub expires_at: Option<DateTime<Utc>>,
}

/// A request as shown in listings.
#[derive(Debug, Clone, Serialize)]
pub struct RequestSummary {
    #[serde(flatten)]
    pub request: donation_request::Model,
    pub donation_types: Vec<DonationType>,
    pub progress: Progress,
}

impl RequestSummary {
    pub(crate) fn new(request: donation_request::Model, now: DateTime<Utc>) -> Self {
        Self {
            donation_types: request.donation_types(),
            progress: Progress::of(&request, now),
            request,
        }
    }
}

/// A request with everything its detail page shows.
#[derive(Debug, Clone, Serialize)]
pub struct RequestDetail {
    #[serde(flatten)]
    pub request: donation_request::Model,
    pub donation_types: Vec<DonationType>,
    pub category: Option<category::Model>,
    pub organization: Option<organization::Model>,
    pub organizer: Option<UserSummary>,
    pub recent_donations: Vec<DonationView>,
    pub stories: Vec<story::Model>,
    pub progress: Progress,
}

/// One row of the organizer dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardEntry {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub status: RequestStatus,
    pub view_count: i32,
    pub progress: Progress,
}

/// Organizer overview across all of their requests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerDashboard {
    pub total_requests: i64,
    /// Every status, zero-filled.
    pub requests_by_status: BTreeMap<&'static str, i64>,
    pub total_raised: Decimal,
    pub total_donations: i64,
    /// Distinct donors across all requests.
    pub supporters: i64,
    pub requests: Vec<DashboardEntry>,
}

/// Donation request service for business logic.
#[derive(Clone)]
pub struct DonationRequestService {
    db: Arc<DatabaseConnection>,
    request_repo: DonationRequestRepository,
    category_repo: CategoryRepository,
    organization_repo: OrganizationRepository,
    user_repo: UserRepository,
    donation_repo: DonationRepository,
    story_repo: StoryRepository,
    id_gen: IdGenerator,
}

impl DonationRequestService {
    /// Create a new donation request service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            request_repo: DonationRequestRepository::new(Arc::clone(&db)),
            category_repo: CategoryRepository::new(Arc::clone(&db)),
            organization_repo: OrganizationRepository::new(Arc::clone(&db)),
            user_repo: UserRepository::new(Arc::clone(&db)),
            donation_repo: DonationRepository::new(Arc::clone(&db)),
            story_repo: StoryRepository::new(Arc::clone(&db)),
            id_gen: IdGenerator::new(),
            db,
        }
    }

    /// All categories.
    pub async fn categories(&self) -> AppResult<Vec<category::Model>> {
        self.category_repo.find_all().await
    }

    /// Submit a new request for review.
    ///
    /// Creates the organizer's organization on first use. The organization,
    /// the user link and the request are written in one transaction.
    pub async fn create(
        &self,
        organizer: &user::Model,
        input: CreateRequestInput,
    ) -> AppResult<RequestDetail> {
        require_organizer(organizer)?;

        let types = parse_donation_types(&input.donation_types)?;

        let category = self
            .category_repo
            .find_by_id(input.category_id)
            .await?
            .ok_or_else(|| AppError::field("category_id", "The selected category is invalid."))?;

        let mut errors = input
            .validate()
            .err()
            .map(|e| collect_field_errors(&e))
            .unwrap_or_default();
        check_type_fields(
            &types,
            &TypeFields {
                goal_amount: input.goal_amount,
                bank_account: input.bank_account.as_ref(),
                items_needed: input.items_needed.as_deref(),
                volunteers_needed: input.volunteers_needed,
                volunteer_details: input.volunteer_details.as_deref(),
            },
            &mut errors,
        );
        if organizer.organization_id.is_none() && is_blank(input.organization_name.as_deref()) {
            push_error(
                &mut errors,
                "organization_name",
                "The organization name field is required.",
            );
        }
        if !errors.is_empty() {
            return Err(AppError::fields(errors));
        }

        let now = Utc::now();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let organization = self
            .resolve_organization(&txn, organizer, &input, now)
            .await?;

        let payment_methods = if types.contains(&DonationType::Money) {
            input
                .bank_account
                .clone()
                .map(|bank_account| PaymentMethods {
                    bank_account,
                    promptpay_id: input.promptpay_id.clone().filter(|p| !p.trim().is_empty()),
                })
                .map(serde_json::to_value)
                .transpose()
                .map_err(|e| AppError::Internal(e.to_string()))?
        } else {
            None
        };

        let model = donation_request::ActiveModel {
            id: Set(self.id_gen.generate()),
            slug: Set(self.id_gen.generate_slug(&input.title)),
            title: Set(input.title.trim().to_string()),
            description: Set(input.description),
            category_id: Set(category.id),
            organizer_id: Set(organizer.id.clone()),
            organization_id: Set(organization.id.clone()),
            urgency: Set(input.urgency),
            accepts_money: Set(types.contains(&DonationType::Money)),
            accepts_items: Set(types.contains(&DonationType::Items)),
            accepts_volunteer: Set(types.contains(&DonationType::Volunteer)),
            goal_amount: Set(input.goal_amount.filter(|_| types.contains(&DonationType::Money))),
            current_amount: Set(Decimal::ZERO),
            payment_methods: Set(payment_methods),
            items_needed: Set(input.items_needed),
            volunteers_needed: Set(input.volunteers_needed),
            volunteers_received: Set(0),
            volunteer_details: Set(input.volunteer_details),
            location: Set(input.location),
            latitude: Set(input.latitude),
            longitude: Set(input.longitude),
            status: Set(RequestStatus::Pending),
            expires_at: Set(input.expires_at.map(Into::into)),
            approved_at: Set(None),
            approved_by: Set(None),
            rejected_at: Set(None),
            view_count: Set(0),
            supporters: Set(0),
            recommendation_score: Set(0.0),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };
        let request = DonationRequestRepository::create_in(&txn, model).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(
            request_id = %request.id,
            organizer_id = %organizer.id,
            organization_id = %organization.id,
            "Donation request submitted"
        );

        Ok(RequestDetail {
            donation_types: request.donation_types(),
            progress: Progress::of(&request, now),
            category: Some(category),
            organization: Some(organization),
            organizer: Some(UserSummary::from(organizer)),
            recent_donations: vec![],
            stories: vec![],
            request,
        })
    }

    async fn resolve_organization(
        &self,
        txn: &DatabaseTransaction,
        organizer: &user::Model,
        input: &CreateRequestInput,
        now: DateTime<Utc>,
    ) -> AppResult<organization::Model> {
        if let Some(org_id) = &organizer.organization_id {
            return OrganizationRepository::find_by_id_in(txn, org_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Organization {org_id}")));
        }

        let model = organization::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input
                .organization_name
                .as_deref()
                .unwrap_or_default()
                .trim()
                .to_string()),
            org_type: Set(input
                .organization_type
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "other".to_string())),
            registration_number: Set(input.registration_number.clone()),
            contact_email: Set(input
                .organization_email
                .clone()
                .unwrap_or_else(|| organizer.email.clone())),
            contact_phone: Set(input
                .organization_phone
                .clone()
                .or_else(|| organizer.phone.clone())),
            address: Set(input.organization_address.clone()),
            created_at: Set(now.into()),
        };
        let organization = OrganizationRepository::create_in(txn, model).await?;

        let mut link: user::ActiveModel = organizer.clone().into();
        link.organization_id = Set(Some(organization.id.clone()));
        link.updated_at = Set(Some(now.into()));
        UserRepository::update_in(txn, link).await?;

        tracing::info!(
            organization_id = %organization.id,
            organizer_id = %organizer.id,
            "Created organization"
        );
        Ok(organization)
    }

    /// Approved requests for public browsing.
    pub async fn list(
        &self,
        filter: &RequestFilter,
        page: u64,
        per_page: u64,
    ) -> AppResult<Paged<RequestSummary>> {
        let now = Utc::now();
        let page = self.request_repo.list_public(filter, page, per_page).await?;
        Ok(page.map(|request| RequestSummary::new(request, now)))
    }

    /// Show a request and count the hit.
    ///
    /// Requests that are not approved are visible only to their organizer and
    /// to admins; everyone else gets a not-found.
    pub async fn show(&self, viewer: Option<&user::Model>, id: &str) -> AppResult<RequestDetail> {
        let mut request = self.visible_request(viewer, id).await?;

        self.request_repo.increment_view_count(&request.id).await?;
        request.view_count += 1;

        self.detail(request).await
    }

    /// Progress of a visible request.
    pub async fn progress(&self, viewer: Option<&user::Model>, id: &str) -> AppResult<Progress> {
        let request = self.visible_request(viewer, id).await?;
        Ok(Progress::of(&request, Utc::now()))
    }

    /// Edit a draft or rejected request. The status is left alone.
    pub async fn update(
        &self,
        organizer: &user::Model,
        id: &str,
        input: UpdateRequestInput,
    ) -> AppResult<RequestDetail> {
        let request = self.request_repo.get_by_id(id).await?;
        ensure_owner(organizer, &request)?;

        if !lifecycle::is_editable(request.status) {
            return Err(AppError::InvalidState(format!(
                "Request is {} and can no longer be edited",
                lifecycle::status_label(request.status)
            )));
        }

        let types = match &input.donation_types {
            Some(tags) => parse_donation_types(tags)?,
            None => request.donation_types(),
        };

        if let Some(category_id) = input.category_id
            && self.category_repo.find_by_id(category_id).await?.is_none()
        {
            return Err(AppError::field(
                "category_id",
                "The selected category is invalid.",
            ));
        }

        let stored_methods: Option<PaymentMethods> = request
            .payment_methods
            .clone()
            .and_then(|value| serde_json::from_value(value).ok());

        let mut errors = input
            .validate()
            .err()
            .map(|e| collect_field_errors(&e))
            .unwrap_or_default();
        check_type_fields(
            &types,
            &TypeFields {
                goal_amount: input.goal_amount.or(request.goal_amount),
                bank_account: input
                    .bank_account
                    .as_ref()
                    .or(stored_methods.as_ref().map(|m| &m.bank_account)),
                items_needed: input
                    .items_needed
                    .as_deref()
                    .or(request.items_needed.as_deref()),
                volunteers_needed: input.volunteers_needed.or(request.volunteers_needed),
                volunteer_details: input
                    .volunteer_details
                    .as_deref()
                    .or(request.volunteer_details.as_deref()),
            },
            &mut errors,
        );
        if !errors.is_empty() {
            return Err(AppError::fields(errors));
        }

        let payment_methods = if input.bank_account.is_some() || input.promptpay_id.is_some() {
            let merged = PaymentMethods {
                bank_account: input
                    .bank_account
                    .clone()
                    .or_else(|| stored_methods.as_ref().map(|m| m.bank_account.clone()))
                    .unwrap_or_default(),
                promptpay_id: input
                    .promptpay_id
                    .clone()
                    .or_else(|| stored_methods.and_then(|m| m.promptpay_id)),
            };
            Some(serde_json::to_value(merged).map_err(|e| AppError::Internal(e.to_string()))?)
        } else {
            None
        };

        let mut active: donation_request::ActiveModel = request.into();
        if let Some(title) = input.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(category_id) = input.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(goal_amount) = input.goal_amount {
            active.goal_amount = Set(Some(goal_amount));
        }
        if let Some(payment_methods) = payment_methods {
            active.payment_methods = Set(Some(payment_methods));
        }
        if let Some(items_needed) = input.items_needed {
            active.items_needed = Set(Some(items_needed));
        }
        if let Some(volunteers_needed) = input.volunteers_needed {
            active.volunteers_needed = Set(Some(volunteers_needed));
        }
        if let Some(volunteer_details) = input.volunteer_details {
            active.volunteer_details = Set(Some(volunteer_details));
        }
        if let Some(urgency) = input.urgency {
            active.urgency = Set(urgency);
        }
        if let Some(location) = input.location {
            active.location = Set(Some(location));
        }
        if let Some(latitude) = input.latitude {
            active.latitude = Set(Some(latitude));
        }
        if let Some(longitude) = input.longitude {
            active.longitude = Set(Some(longitude));
        }
        if let Some(expires_at) = input.expires_at {
            active.expires_at = Set(Some(expires_at.into()));
        }
        active.accepts_money = Set(types.contains(&DonationType::Money));
        active.accepts_items = Set(types.contains(&DonationType::Items));
        active.accepts_volunteer = Set(types.contains(&DonationType::Volunteer));
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.request_repo.update(active).await?;
        tracing::info!(request_id = %updated.id, "Donation request updated");

        self.detail(updated).await
    }

    /// Send a draft or rejected request (back) to review.
    pub async fn submit(&self, organizer: &user::Model, id: &str) -> AppResult<RequestSummary> {
        let request = self.request_repo.get_by_id(id).await?;
        ensure_owner(organizer, &request)?;

        let next = lifecycle::next_status(request.status, Transition::Submit)?;
        let changes = donation_request::ActiveModel {
            status: Set(next),
            rejected_at: Set(None),
            updated_at: Set(Some(Utc::now().into())),
            ..Default::default()
        };

        if !self
            .request_repo
            .update_if_status(id, Transition::Submit.sources(), changes)
            .await?
        {
            return Err(AppError::InvalidState(
                "Request status changed while submitting".to_string(),
            ));
        }

        tracing::info!(request_id = %id, from = ?request.status, "Donation request resubmitted");

        let request = self.request_repo.get_by_id(id).await?;
        Ok(RequestSummary::new(request, Utc::now()))
    }

    /// Delete a draft.
    pub async fn delete(&self, organizer: &user::Model, id: &str) -> AppResult<()> {
        let request = self.request_repo.get_by_id(id).await?;
        ensure_owner(organizer, &request)?;

        if !lifecycle::is_deletable(request.status) {
            return Err(AppError::InvalidState(format!(
                "Only draft requests can be deleted; this one is {}",
                lifecycle::status_label(request.status)
            )));
        }

        self.request_repo.delete(id).await?;
        tracing::info!(request_id = %id, organizer_id = %organizer.id, "Donation request deleted");
        Ok(())
    }

    /// The organizer's own requests in any status.
    pub async fn my_requests(
        &self,
        organizer: &user::Model,
        status: Option<RequestStatus>,
        page: u64,
        per_page: u64,
    ) -> AppResult<Paged<RequestSummary>> {
        require_organizer(organizer)?;

        let now = Utc::now();
        let page = self
            .request_repo
            .list_by_organizer(&organizer.id, status, page, per_page)
            .await?;
        Ok(page.map(|request| RequestSummary::new(request, now)))
    }

    /// Counts, totals and per-request progress for an organizer.
    pub async fn dashboard(&self, organizer: &user::Model) -> AppResult<OrganizerDashboard> {
        require_organizer(organizer)?;

        let counts = self
            .request_repo
            .count_by_status(Some(&organizer.id))
            .await?;
        let totals = self.donation_repo.totals_for_organizer(&organizer.id).await?;
        let requests = self
            .request_repo
            .find_all_by_organizer(&organizer.id)
            .await?;

        let mut requests_by_status: BTreeMap<&'static str, i64> = RequestStatus::iter()
            .map(|status| (lifecycle::status_code(status), 0))
            .collect();
        for (status, count) in counts {
            requests_by_status.insert(lifecycle::status_code(status), count);
        }

        let now = Utc::now();
        Ok(OrganizerDashboard {
            total_requests: requests_by_status.values().sum(),
            requests_by_status,
            total_raised: totals.amount(),
            total_donations: totals.count,
            supporters: totals.supporters,
            requests: requests
                .into_iter()
                .map(|request| DashboardEntry {
                    progress: Progress::of(&request, now),
                    id: request.id,
                    title: request.title,
                    slug: request.slug,
                    status: request.status,
                    view_count: request.view_count,
                })
                .collect(),
        })
    }

    async fn visible_request(
        &self,
        viewer: Option<&user::Model>,
        id: &str,
    ) -> AppResult<donation_request::Model> {
        let request = self.request_repo.get_by_id(id).await?;
        if can_view(viewer, &request) {
            Ok(request)
        } else {
            Err(AppError::RequestNotFound(id.to_string()))
        }
    }

    async fn detail(&self, request: donation_request::Model) -> AppResult<RequestDetail> {
        let category = self.category_repo.find_by_id(request.category_id).await?;
        let organization = self
            .organization_repo
            .find_by_id(&request.organization_id)
            .await?;
        let organizer = self.user_repo.find_by_id(&request.organizer_id).await?;

        let donations = self
            .donation_repo
            .find_recent_by_request(&request.id, RECENT_DONATIONS)
            .await?;
        let donor_ids: Vec<String> = donations.iter().map(|d| d.donor_id.clone()).collect();
        let donors = self.user_repo.find_by_ids(&donor_ids).await?;
        let recent_donations = donations
            .into_iter()
            .map(|donation| {
                let donor = donors.iter().find(|u| u.id == donation.donor_id);
                DonationView::new(donation, donor)
            })
            .collect();

        let stories = self
            .story_repo
            .find_published_by_request(&request.id, RECENT_STORIES)
            .await?;

        Ok(RequestDetail {
            donation_types: request.donation_types(),
            progress: Progress::of(&request, Utc::now()),
            category,
            organization,
            organizer: organizer.as_ref().map(UserSummary::from),
            recent_donations,
            stories,
            request,
        })
    }
}

/// Whether `viewer` may see `request`.
pub(crate) fn can_view(viewer: Option<&user::Model>, request: &donation_request::Model) -> bool {
    match request.status {
        RequestStatus::Approved => true,
        RequestStatus::Draft | RequestStatus::Pending | RequestStatus::Rejected => {
            viewer.is_some_and(|v| v.role == user::UserRole::Admin || v.id == request.organizer_id)
        }
    }
}

fn ensure_owner(organizer: &user::Model, request: &donation_request::Model) -> AppResult<()> {
    if request.organizer_id == organizer.id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You do not own this donation request".to_string(),
        ))
    }
}

/// Parse and de-duplicate donation type tags.
fn parse_donation_types(tags: &[String]) -> AppResult<Vec<DonationType>> {
    if tags.is_empty() {
        return Err(AppError::field(
            "donation_types",
            "Select at least one donation type.",
        ));
    }

    let mut types = Vec::with_capacity(tags.len());
    for tag in tags {
        let kind = DonationType::from_tag(tag.trim()).ok_or_else(|| {
            AppError::field(
                "donation_types",
                format!("The donation type '{tag}' is invalid."),
            )
        })?;
        if !types.contains(&kind) {
            types.push(kind);
        }
    }
    Ok(types)
}

/// Type-conditional fields after merging input with stored values.
struct TypeFields<'a> {
    goal_amount: Option<Decimal>,
    bank_account: Option<&'a BankAccount>,
    items_needed: Option<&'a str>,
    volunteers_needed: Option<i32>,
    volunteer_details: Option<&'a str>,
}

fn check_type_fields(types: &[DonationType], fields: &TypeFields<'_>, errors: &mut FieldErrors) {
    for kind in types {
        match kind {
            DonationType::Money => {
                if fields
                    .goal_amount
                    .is_none_or(|goal| goal < Decimal::from(MIN_GOAL_AMOUNT))
                {
                    push_error(
                        errors,
                        "goal_amount",
                        "The goal amount must be at least 1000.",
                    );
                }
                if !fields.bank_account.is_some_and(BankAccount::is_complete) {
                    push_error(
                        errors,
                        "bank_account",
                        "Bank name, account number and account name are required.",
                    );
                }
            }
            DonationType::Items => {
                if is_blank(fields.items_needed) {
                    push_error(
                        errors,
                        "items_needed",
                        "The items needed field is required when accepting items.",
                    );
                }
            }
            DonationType::Volunteer => {
                if fields.volunteers_needed.is_none_or(|n| n < 1) {
                    push_error(
                        errors,
                        "volunteers_needed",
                        "At least one volunteer must be requested.",
                    );
                }
                if is_blank(fields.volunteer_details) {
                    push_error(
                        errors,
                        "volunteer_details",
                        "The volunteer details field is required when accepting volunteers.",
                    );
                }
            }
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

fn push_error(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}
