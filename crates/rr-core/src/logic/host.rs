use super::{get, FieldValue, Logic};
use crate::error::{AppError, Result};
use crate::form::{self, parse_optional_id, validate_text, FormMap};
use crate::models::Host;
use crate::traits::HostRepo;
use async_trait::async_trait;
use std::sync::Arc;

/// Typed Host input extracted from a form.
#[derive(Debug, Clone, PartialEq)]
pub struct HostForm {
    pub id: Option<i32>,
    pub name: String,
    pub url: String,
    pub extraction_type: String,
}

impl HostForm {
    pub fn from_form(form: &FormMap) -> Result<Self> {
        Ok(Self {
            id: parse_optional_id(form)?,
            name: form.first(HostLogic::NAME)?.to_string(),
            url: form.first(HostLogic::URL)?.to_string(),
            extraction_type: form.first(HostLogic::EXTRACTION_TYPE)?.to_string(),
        })
    }

    pub fn validate(&self) -> Result<()> {
        validate_text(HostLogic::NAME, &self.name, 100)?;
        validate_text(HostLogic::URL, &self.url, 255)?;
        validate_text(HostLogic::EXTRACTION_TYPE, &self.extraction_type, 45)
    }
}

pub struct HostLogic {
    repo: Arc<dyn HostRepo>,
}

impl HostLogic {
    pub const ID: &'static str = form::ID;
    pub const NAME: &'static str = "name";
    pub const URL: &'static str = "url";
    pub const EXTRACTION_TYPE: &'static str = "extractionType";

    pub fn new(repo: Arc<dyn HostRepo>) -> Self {
        Self { repo }
    }

    pub async fn get_host_with_name(&self, name: &str) -> Result<Option<Host>> {
        get(self.repo.find_by_name(name)).await
    }

    pub async fn get_host_with_url(&self, url: &str) -> Result<Option<Host>> {
        get(self.repo.find_by_url(url)).await
    }

    pub async fn get_hosts_with_extraction_type(&self, extraction_type: &str) -> Result<Vec<Host>> {
        get(self.repo.find_by_extraction_type(extraction_type)).await
    }

    /// Creates and stores a host unless one with the submitted name exists.
    pub async fn register(&self, form: &FormMap) -> Result<Host> {
        if let Ok(name) = form.first(Self::NAME) {
            if self.get_host_with_name(name).await?.is_some() {
                return Err(AppError::Conflict(format!("Name: \"{name}\" already exists")));
            }
        }
        let host = self.create_entity(form).await?;
        let stored = self.add(&host).await?;
        log::info!("registered host {:?} ({})", stored.id, stored.name);
        Ok(stored)
    }
}

#[async_trait]
impl Logic for HostLogic {
    type Entity = Host;
    const ENTITY: &'static str = "Host";

    async fn get_all(&self) -> Result<Vec<Host>> {
        get(self.repo.find_all()).await
    }

    async fn get_with_id(&self, id: i32) -> Result<Option<Host>> {
        get(self.repo.find_by_id(id)).await
    }

    async fn create_entity(&self, form: &FormMap) -> Result<Host> {
        let input = HostForm::from_form(form)?;
        input.validate()?;
        Ok(Host {
            id: input.id,
            name: input.name,
            url: input.url,
            extraction_type: input.extraction_type,
        })
    }

    async fn add(&self, host: &Host) -> Result<Host> {
        get(self.repo.insert(host)).await
    }

    async fn delete(&self, host: &Host) -> Result<()> {
        match host.id {
            Some(id) => get(self.repo.delete(id)).await,
            None => Ok(()),
        }
    }

    fn column_names(&self) -> &'static [&'static str] {
        &["ID", "Name", "URL", "ExtractionType"]
    }

    fn column_codes(&self) -> &'static [&'static str] {
        &[Self::ID, Self::NAME, Self::URL, Self::EXTRACTION_TYPE]
    }

    fn extract_data_as_list(&self, host: &Host) -> Vec<FieldValue> {
        vec![
            FieldValue::Id(host.id),
            FieldValue::Text(host.name.clone()),
            FieldValue::Text(host.url.clone()),
            FieldValue::Text(host.extraction_type.clone()),
        ]
    }
}
