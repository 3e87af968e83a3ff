//! Inventory route handlers.
//!
//! Browsing (classification lists, vehicle detail) is public. Everything
//! under management requires an employee or admin account.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Datelike;
use tracing::instrument;

use cse_motors_core::{ClassificationId, InventoryId};

use super::{ClassificationOption, classification_options, parse_id};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireEmployee;
use crate::models::{Review, Vehicle};
use crate::routes::layout::{Layout, Page};
use crate::validation::{
    ClassificationForm, FormError, InventoryDeleteForm, InventoryForm, ReviewForm,
    ValidationErrors,
};

const VEHICLE_NOT_FOUND: &str = "Sorry, we couldn't find that vehicle.";
const CLASSIFICATION_NOT_FOUND: &str = "Sorry, we couldn't find that classification.";
const MANAGEMENT_PATH: &str = "/inv/";

// =============================================================================
// Templates
// =============================================================================

/// Vehicles in one classification.
#[derive(Template, WebTemplate)]
#[template(path = "inventory/classification.html")]
pub struct ClassificationTemplate {
    pub layout: Layout,
    pub vehicles: Vec<Vehicle>,
}

/// A review as shown on the detail page.
#[derive(Debug, Clone)]
pub struct ReviewView {
    pub review: Review,
    /// The viewer wrote this review.
    pub can_delete: bool,
}

/// Vehicle detail with reviews and the review form.
#[derive(Template, WebTemplate)]
#[template(path = "inventory/detail.html")]
pub struct DetailTemplate {
    pub layout: Layout,
    pub vehicle: Vehicle,
    pub reviews: Vec<ReviewView>,
    pub review_form: ReviewForm,
    pub errors: ValidationErrors,
}

/// Management landing page.
#[derive(Template, WebTemplate)]
#[template(path = "inventory/management.html")]
pub struct ManagementTemplate {
    pub layout: Layout,
    pub classifications: Vec<ClassificationOption>,
}

/// New classification form.
#[derive(Template, WebTemplate)]
#[template(path = "inventory/add-classification.html")]
pub struct AddClassificationTemplate {
    pub layout: Layout,
    pub form: ClassificationForm,
    pub errors: ValidationErrors,
}

/// New vehicle form.
#[derive(Template, WebTemplate)]
#[template(path = "inventory/add-inventory.html")]
pub struct AddInventoryTemplate {
    pub layout: Layout,
    pub form: InventoryForm,
    pub classifications: Vec<ClassificationOption>,
    pub errors: ValidationErrors,
}

/// Edit vehicle form.
#[derive(Template, WebTemplate)]
#[template(path = "inventory/edit-inventory.html")]
pub struct EditInventoryTemplate {
    pub layout: Layout,
    pub form: InventoryForm,
    pub classifications: Vec<ClassificationOption>,
    pub errors: ValidationErrors,
}

/// Delete confirmation.
#[derive(Template, WebTemplate)]
#[template(path = "inventory/delete-confirm.html")]
pub struct DeleteConfirmTemplate {
    pub layout: Layout,
    pub vehicle: Vehicle,
}

// =============================================================================
// Public pages
// =============================================================================

/// Display the vehicles in a classification.
#[instrument(skip(page))]
pub async fn by_classification(
    page: Page,
    Path(classification_id): Path<String>,
) -> Result<ClassificationTemplate> {
    let id: ClassificationId = parse_id(&classification_id, CLASSIFICATION_NOT_FOUND)?;
    let inventory = page.state.inventory();

    let classification = inventory
        .get_classification_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(CLASSIFICATION_NOT_FOUND.to_string()))?;
    let vehicles = inventory.get_inventory_by_classification_id(id).await?;

    Ok(ClassificationTemplate {
        layout: page
            .layout(format!("{} vehicles", classification.classification_name))
            .await?,
        vehicles,
    })
}

/// Display a vehicle with its reviews.
#[instrument(skip(page))]
pub async fn detail(page: Page, Path(inv_id): Path<String>) -> Result<Response> {
    let id: InventoryId = parse_id(&inv_id, VEHICLE_NOT_FOUND)?;
    render_detail(
        &page,
        id,
        ReviewForm::default(),
        ValidationErrors::new(),
        StatusCode::OK,
    )
    .await
}

/// Build the detail page, overlaying a review submission and its errors.
///
/// The review handler calls this to re-render a rejected review in place.
pub(crate) async fn render_detail(
    page: &Page,
    inv_id: InventoryId,
    mut review_form: ReviewForm,
    errors: ValidationErrors,
    status: StatusCode,
) -> Result<Response> {
    let vehicle = page
        .state
        .inventory()
        .get_inventory_by_id(inv_id)
        .await?
        .ok_or_else(|| AppError::NotFound(VEHICLE_NOT_FOUND.to_string()))?;
    let viewer = page.claims().map(|c| c.account_id);
    let reviews = page
        .state
        .reviews()
        .get_reviews_by_inventory_id(inv_id)
        .await?
        .into_iter()
        .map(|review| ReviewView {
            can_delete: viewer.is_some_and(|id| review.is_authored_by(id)),
            review,
        })
        .collect();
    review_form.inv_id = vehicle.inv_id.to_string();

    let template = DetailTemplate {
        layout: page.layout(vehicle.title()).await?,
        vehicle,
        reviews,
        review_form,
        errors,
    };
    Ok((status, template).into_response())
}

/// Intentionally fail so the error page can be checked end to end.
pub async fn trigger_error() -> Result<Response> {
    Err(AppError::Internal(
        "intentional error from /inv/trigger-error".to_string(),
    ))
}

// =============================================================================
// Management
// =============================================================================

/// Display the management landing page.
#[instrument(skip_all)]
pub async fn management(_employee: RequireEmployee, page: Page) -> Result<ManagementTemplate> {
    let classifications = page.state.inventory().get_classifications().await?;
    Ok(ManagementTemplate {
        layout: page.layout("Inventory Management").await?,
        classifications: classification_options(&classifications, ""),
    })
}

/// Vehicles in a classification as JSON, for the management table.
#[instrument(skip(page, _employee))]
pub async fn inventory_json(
    _employee: RequireEmployee,
    page: Page,
    Path(classification_id): Path<String>,
) -> Result<Json<Vec<Vehicle>>> {
    let id: ClassificationId = parse_id(&classification_id, CLASSIFICATION_NOT_FOUND)?;
    let vehicles = page
        .state
        .inventory()
        .get_inventory_by_classification_id(id)
        .await?;
    Ok(Json(vehicles))
}

async fn render_add_classification(
    page: &Page,
    form: ClassificationForm,
    errors: ValidationErrors,
    status: StatusCode,
) -> Result<Response> {
    let template = AddClassificationTemplate {
        layout: page.layout("Add New Classification").await?,
        form,
        errors,
    };
    Ok((status, template).into_response())
}

/// Display the new classification form.
#[instrument(skip_all)]
pub async fn add_classification_page(_employee: RequireEmployee, page: Page) -> Result<Response> {
    render_add_classification(
        &page,
        ClassificationForm::default(),
        ValidationErrors::new(),
        StatusCode::OK,
    )
    .await
}

/// Create a classification.
#[instrument(skip_all)]
pub async fn add_classification(
    _employee: RequireEmployee,
    page: Page,
    Form(form): Form<ClassificationForm>,
) -> Result<Response> {
    let name = match page.state.validator().classification(&form).await {
        Ok(name) => name,
        Err(FormError::Invalid(errors)) => {
            return render_add_classification(&page, form, errors, StatusCode::BAD_REQUEST).await;
        }
        Err(FormError::Store(e)) => return Err(e.into()),
    };

    match page.state.inventory().register_classification(&name).await {
        Ok(classification) => {
            tracing::info!(
                classification_id = %classification.classification_id,
                "Classification created"
            );
            page.notice(format!(
                "Congratulations, the new classification \"{}\" has been added.",
                classification.classification_name
            ))
            .await?;
            Ok(Redirect::to(MANAGEMENT_PATH).into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to register classification");
            page.notice("Sorry, the registration failed.").await?;
            render_add_classification(
                &page,
                form,
                ValidationErrors::new(),
                StatusCode::NOT_IMPLEMENTED,
            )
            .await
        }
    }
}

async fn render_add_inventory(
    page: &Page,
    form: InventoryForm,
    errors: ValidationErrors,
    status: StatusCode,
) -> Result<Response> {
    let classifications = page.state.inventory().get_classifications().await?;
    let template = AddInventoryTemplate {
        layout: page.layout("Add New Vehicle").await?,
        classifications: classification_options(&classifications, &form.classification_id),
        form,
        errors,
    };
    Ok((status, template).into_response())
}

/// Display the new vehicle form.
#[instrument(skip_all)]
pub async fn add_inventory_page(_employee: RequireEmployee, page: Page) -> Result<Response> {
    render_add_inventory(
        &page,
        InventoryForm::default(),
        ValidationErrors::new(),
        StatusCode::OK,
    )
    .await
}

/// Create a vehicle.
#[instrument(skip_all)]
pub async fn add_inventory(
    _employee: RequireEmployee,
    page: Page,
    Form(form): Form<InventoryForm>,
) -> Result<Response> {
    let draft = match form.validate(current_year()) {
        Ok(draft) => draft,
        Err(errors) => {
            return render_add_inventory(&page, form, errors, StatusCode::BAD_REQUEST).await;
        }
    };

    match page.state.inventory().register_inventory(draft).await {
        Ok(vehicle) => {
            tracing::info!(inv_id = %vehicle.inv_id, "Vehicle added");
            page.notice(format!(
                "Success! The {} has been added to the inventory.",
                vehicle.make_model()
            ))
            .await?;
            Ok(Redirect::to(MANAGEMENT_PATH).into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to add vehicle");
            page.notice("Sorry, adding the vehicle failed.").await?;
            render_add_inventory(
                &page,
                form,
                ValidationErrors::new(),
                StatusCode::NOT_IMPLEMENTED,
            )
            .await
        }
    }
}

async fn render_edit(
    page: &Page,
    form: InventoryForm,
    errors: ValidationErrors,
    status: StatusCode,
) -> Result<Response> {
    let classifications = page.state.inventory().get_classifications().await?;
    let template = EditInventoryTemplate {
        layout: page
            .layout(format!("Edit {} {}", form.inv_make.trim(), form.inv_model.trim()))
            .await?,
        classifications: classification_options(&classifications, &form.classification_id),
        form,
        errors,
    };
    Ok((status, template).into_response())
}

/// Display the edit form for a vehicle.
#[instrument(skip(page, _employee))]
pub async fn edit_page(
    _employee: RequireEmployee,
    page: Page,
    Path(inv_id): Path<String>,
) -> Result<Response> {
    let vehicle = find_vehicle(&page, &inv_id).await?;
    render_edit(
        &page,
        InventoryForm::from(&vehicle),
        ValidationErrors::new(),
        StatusCode::OK,
    )
    .await
}

/// Update a vehicle.
#[instrument(skip_all)]
pub async fn update(
    _employee: RequireEmployee,
    page: Page,
    Form(form): Form<InventoryForm>,
) -> Result<Response> {
    let id: InventoryId = parse_id(&form.inv_id, VEHICLE_NOT_FOUND)?;
    let draft = match form.validate(current_year()) {
        Ok(draft) => draft,
        Err(errors) => return render_edit(&page, form, errors, StatusCode::BAD_REQUEST).await,
    };

    match page.state.inventory().update_inventory(id, draft).await {
        Ok(vehicle) => {
            tracing::info!(inv_id = %vehicle.inv_id, "Vehicle updated");
            page.notice(format!(
                "The {} was successfully updated.",
                vehicle.make_model()
            ))
            .await?;
            Ok(Redirect::to(MANAGEMENT_PATH).into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, inv_id = %id, "Failed to update vehicle");
            page.notice("Sorry, the update failed.").await?;
            render_edit(
                &page,
                form,
                ValidationErrors::new(),
                StatusCode::NOT_IMPLEMENTED,
            )
            .await
        }
    }
}

/// Display the delete confirmation for a vehicle.
#[instrument(skip(page, _employee))]
pub async fn delete_page(
    _employee: RequireEmployee,
    page: Page,
    Path(inv_id): Path<String>,
) -> Result<DeleteConfirmTemplate> {
    let vehicle = find_vehicle(&page, &inv_id).await?;
    Ok(DeleteConfirmTemplate {
        layout: page
            .layout(format!("Delete {}", vehicle.make_model()))
            .await?,
        vehicle,
    })
}

/// Delete a vehicle.
#[instrument(skip_all)]
pub async fn delete(
    _employee: RequireEmployee,
    page: Page,
    Form(form): Form<InventoryDeleteForm>,
) -> Result<Redirect> {
    let id: InventoryId = parse_id(&form.inv_id, VEHICLE_NOT_FOUND)?;

    match page.state.inventory().delete_inventory_item(id).await {
        Ok(rows) if rows > 0 => {
            tracing::info!(inv_id = %id, "Vehicle deleted");
            page.notice("The deletion was successful.").await?;
            Ok(Redirect::to(MANAGEMENT_PATH))
        }
        outcome => {
            if let Err(e) = outcome {
                tracing::warn!(error = %e, inv_id = %id, "Failed to delete vehicle");
            }
            page.notice("Sorry, the delete failed.").await?;
            Ok(Redirect::to(&format!("/inv/delete/{id}")))
        }
    }
}

async fn find_vehicle(page: &Page, raw_id: &str) -> Result<Vehicle> {
    let id: InventoryId = parse_id(raw_id, VEHICLE_NOT_FOUND)?;
    page.state
        .inventory()
        .get_inventory_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(VEHICLE_NOT_FOUND.to_string()))
}

fn current_year() -> i32 {
    chrono::Utc::now().year()
}
