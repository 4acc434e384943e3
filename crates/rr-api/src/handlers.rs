//! # rr-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the core logic
//! services. Handlers gather data into the `rr-ui` view structs and render
//! them; they hold no domain rules of their own.

use crate::error::ApiError;
use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use rr_core::error::AppError;
use rr_core::form::FormMap;
use rr_core::models::ExtractionType;
use rr_core::{
    BoardLogic, EntityKind, HostLogic, ImageIngestor, IngestReport, Logic, LogicRegistry, MediaStore, TableSource,
};
use rr_ui::{FormField, FormTemplate, GalleryItem, GalleryTemplate, IndexTemplate, Link, SelectOption, TableTemplate, Template};
use std::path::Path;
use std::sync::Arc;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub registry: LogicRegistry,
    pub store: Arc<dyn MediaStore>,
    pub ingestor: Arc<ImageIngestor>,
}

type Pairs = Vec<(String, String)>;

/// Submit button that redirects to the table once the entity is stored.
const VIEW_BUTTON: &str = "view";

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(body)
}

fn see_other(location: String) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub fn table_path(kind: EntityKind) -> String {
    format!("/{kind}Table")
}

pub fn create_path(kind: EntityKind) -> String {
    format!("/Create{kind}")
}

pub async fn index() -> Result<HttpResponse, ApiError> {
    let mut links: Vec<Link> = EntityKind::ALL
        .iter()
        .map(|kind| Link::new(format!("{kind} Table"), table_path(*kind)))
        .collect();
    for kind in [EntityKind::Host, EntityKind::Board] {
        links.push(Link::new(format!("Create {kind}"), create_path(kind)));
    }
    links.push(Link::new("Image View", "/ImageView"));

    let page = IndexTemplate {
        title: "Rusty-Reader".into(),
        links,
    };
    Ok(html(page.render()?))
}

// ── Tables ───────────────────────────────────────────────────────────────────

async fn render_table(data: &AppState, kind: EntityKind, query: Pairs) -> Result<HttpResponse, ApiError> {
    let table = data.registry.table(kind);
    let rows = table
        .rows()
        .await?
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();

    let page = TableTemplate {
        title: format!("{} Table", table.caption()),
        caption: table.caption().to_string(),
        headers: table.headers().iter().map(|h| h.to_string()).collect(),
        rows,
        submitted: FormMap::from_pairs(query).describe(),
    };
    Ok(html(page.render()?))
}

/// Renders the table of any entity (e.g., /tables/board)
pub async fn entity_table(
    data: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<Pairs>,
) -> Result<HttpResponse, ApiError> {
    let kind: EntityKind = path.into_inner().parse()?;
    render_table(&data, kind, query.into_inner()).await
}

pub async fn host_table(data: web::Data<AppState>, query: web::Query<Pairs>) -> Result<HttpResponse, ApiError> {
    render_table(&data, EntityKind::Host, query.into_inner()).await
}

pub async fn board_table(data: web::Data<AppState>, query: web::Query<Pairs>) -> Result<HttpResponse, ApiError> {
    render_table(&data, EntityKind::Board, query.into_inner()).await
}

pub async fn image_table(data: web::Data<AppState>, query: web::Query<Pairs>) -> Result<HttpResponse, ApiError> {
    render_table(&data, EntityKind::Image, query.into_inner()).await
}

// ── Create forms ─────────────────────────────────────────────────────────────

/// Dropdown choices for a form key, `None` for free text.
async fn options_for(data: &AppState, code: &str) -> Result<Option<Vec<SelectOption>>, ApiError> {
    let options = match code {
        HostLogic::EXTRACTION_TYPE => ExtractionType::ALL
            .iter()
            .map(|t| SelectOption::new(t.as_str(), t.as_str()))
            .collect(),
        BoardLogic::HOST_ID => data
            .registry
            .hosts()
            .get_all()
            .await?
            .into_iter()
            .filter_map(|host| host.id.map(|id| SelectOption::new(id.to_string(), host.name)))
            .collect(),
        _ => return Ok(None),
    };
    Ok(Some(options))
}

/// Builds the create form of `kind` from its column codes. `prefill` carries
/// the rejected submission back into the inputs.
async fn render_form(
    data: &AppState,
    kind: EntityKind,
    error: Option<String>,
    prefill: Option<&FormMap>,
    submitted: &FormMap,
) -> Result<HttpResponse, ApiError> {
    let table = data.registry.table(kind);
    let mut fields = Vec::new();
    for (code, label) in table.codes().iter().zip(table.headers()) {
        if *code == rr_core::form::ID {
            continue;
        }
        let field = match options_for(data, code).await? {
            // Without any choice to offer the key is typed in by hand.
            Some(options) if !options.is_empty() => FormField::select(*code, *label, options),
            _ => FormField::text(*code, *label),
        };
        let value = prefill.and_then(|form| form.first(code).ok()).unwrap_or_default();
        fields.push(field.with_value(value));
    }

    let page = FormTemplate {
        title: format!("Create {kind}"),
        action: create_path(kind),
        fields,
        error,
        table_href: table_path(kind),
        submitted: submitted.describe(),
    };
    Ok(html(page.render()?))
}

/// Outcome of a create submission: redirect, or the form again with an
/// inline message for anything the user can fix.
async fn handle_create<T>(
    data: &AppState,
    kind: EntityKind,
    form: FormMap,
    result: Result<T, AppError>,
) -> Result<HttpResponse, ApiError> {
    match result {
        Ok(_) if form.contains(VIEW_BUTTON) => Ok(see_other(table_path(kind))),
        Ok(_) => render_form(data, kind, None, None, &form).await,
        Err(e) if e.is_user_error() => {
            log::debug!("rejected {kind} submission: {e}");
            render_form(data, kind, Some(e.to_string()), Some(&form), &form).await
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn create_host_form(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    render_form(&data, EntityKind::Host, None, None, &FormMap::new()).await
}

pub async fn create_host(data: web::Data<AppState>, form: web::Form<Pairs>) -> Result<HttpResponse, ApiError> {
    let form = FormMap::from_pairs(form.into_inner());
    let result = data.registry.hosts().register(&form).await;
    handle_create(&data, EntityKind::Host, form, result).await
}

pub async fn create_board_form(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    render_form(&data, EntityKind::Board, None, None, &FormMap::new()).await
}

pub async fn create_board(data: web::Data<AppState>, form: web::Form<Pairs>) -> Result<HttpResponse, ApiError> {
    let form = FormMap::from_pairs(form.into_inner());
    let result = data.registry.boards().register(&form).await;
    handle_create(&data, EntityKind::Board, form, result).await
}

// ── Images ───────────────────────────────────────────────────────────────────

async fn render_gallery(data: &AppState, report: Option<IngestReport>) -> Result<HttpResponse, ApiError> {
    let images = data.registry.images();
    let mut items = Vec::new();
    for image in images.get_all().await? {
        let Some(file_name) = Path::new(&image.local_path).file_name().and_then(|n| n.to_str()) else {
            log::warn!("image {:?} has no file name in {}", image.id, image.local_path);
            continue;
        };
        items.push(GalleryItem {
            full_url: data.store.get_url(file_name).await,
            thumb_url: data.store.get_thumbnail_url(file_name).await,
            date: images.convert_date(image.date),
            board: image.board.name,
            title: image.title,
        });
    }

    let (summary, errors) = match report {
        Some(report) => (
            Some(format!(
                "Checked {} boards: {} added, {} already known, {} skipped.",
                report.boards, report.added, report.known, report.filtered
            )),
            report.errors,
        ),
        None => (None, Vec::new()),
    };

    let page = GalleryTemplate {
        title: "Image View".into(),
        items,
        summary,
        errors,
    };
    Ok(html(page.render()?))
}

pub async fn image_view(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    render_gallery(&data, None).await
}

/// Runs one ingestion pass, then shows the gallery with its summary.
pub async fn ingest_images(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let report = data.ingestor.run().await?;
    render_gallery(&data, Some(report)).await
}

/// Streams a stored image (e.g., /ImageDelivery/abc.jpg)
pub async fn image_delivery(data: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let file_name = path.into_inner();
    let bytes = data
        .store
        .load(&file_name)
        .await
        .map_err(|e| AppError::Internal(format!("unable to read {file_name}: {e:#}")))?
        .ok_or_else(|| AppError::NotFound("Image".into(), file_name.clone()))?;

    let mime = mime_guess::from_path(&file_name).first_or_octet_stream();
    Ok(HttpResponse::Ok()
        .content_type(mime.essence_str())
        .insert_header((header::CONTENT_LENGTH, bytes.len()))
        .insert_header(ContentDisposition {
            disposition: DispositionType::Inline,
            parameters: vec![DispositionParam::Filename(file_name)],
        })
        .body(bytes))
}
