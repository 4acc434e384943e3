use super::{get, FieldValue, HostLogic, Logic};
use crate::error::{AppError, Result};
use crate::form::{self, parse_id, parse_optional_id, validate_text, FormMap};
use crate::models::Board;
use crate::traits::BoardRepo;
use async_trait::async_trait;
use std::sync::Arc;

/// Typed Board input extracted from a form. The host is still an unresolved id.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardForm {
    pub id: Option<i32>,
    pub name: String,
    pub url: String,
    pub host_id: i32,
}

impl BoardForm {
    pub fn from_form(form: &FormMap) -> Result<Self> {
        let id = parse_optional_id(form)?;
        let name = form.first(BoardLogic::NAME)?.to_string();
        let url = form.first(BoardLogic::URL)?.to_string();
        let host_id = form.first(BoardLogic::HOST_ID)?;
        Ok(Self {
            id,
            name,
            url,
            host_id: parse_id(BoardLogic::HOST_ID, host_id)?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        validate_text(BoardLogic::NAME, &self.name, 100)?;
        validate_text(BoardLogic::URL, &self.url, 255)
    }
}

pub struct BoardLogic {
    repo: Arc<dyn BoardRepo>,
    hosts: Arc<HostLogic>,
}

impl BoardLogic {
    pub const ID: &'static str = form::ID;
    pub const URL: &'static str = "url";
    pub const NAME: &'static str = "name";
    pub const HOST_ID: &'static str = "hostId";

    /// The host reference is resolved through `hosts`, never through its repository.
    pub fn new(repo: Arc<dyn BoardRepo>, hosts: Arc<HostLogic>) -> Self {
        Self { repo, hosts }
    }

    pub async fn get_boards_with_host_id(&self, host_id: i32) -> Result<Vec<Board>> {
        get(self.repo.find_by_host_id(host_id)).await
    }

    pub async fn get_boards_with_name(&self, name: &str) -> Result<Vec<Board>> {
        get(self.repo.find_by_name(name)).await
    }

    pub async fn get_board_with_url(&self, url: &str) -> Result<Option<Board>> {
        get(self.repo.find_by_url(url)).await
    }

    /// Creates and stores a board unless one with the submitted url exists.
    pub async fn register(&self, form: &FormMap) -> Result<Board> {
        if let Ok(url) = form.first(Self::URL) {
            if self.get_board_with_url(url).await?.is_some() {
                return Err(AppError::Conflict(format!("Url: \"{url}\" already exists")));
            }
        }
        let board = self.create_entity(form).await?;
        let stored = self.add(&board).await?;
        log::info!("registered board {:?} ({}) under host {:?}", stored.id, stored.name, stored.host.id);
        Ok(stored)
    }
}

#[async_trait]
impl Logic for BoardLogic {
    type Entity = Board;
    const ENTITY: &'static str = "Board";

    async fn get_all(&self) -> Result<Vec<Board>> {
        get(self.repo.find_all()).await
    }

    async fn get_with_id(&self, id: i32) -> Result<Option<Board>> {
        get(self.repo.find_by_id(id)).await
    }

    async fn create_entity(&self, form: &FormMap) -> Result<Board> {
        let input = BoardForm::from_form(form)?;
        input.validate()?;

        let host = self
            .hosts
            .get_with_id(input.host_id)
            .await?
            .ok_or(AppError::MissingReference { entity: HostLogic::ENTITY, id: input.host_id })?;

        Ok(Board {
            id: input.id,
            name: input.name,
            url: input.url,
            host,
        })
    }

    async fn add(&self, board: &Board) -> Result<Board> {
        get(self.repo.insert(board)).await
    }

    async fn delete(&self, board: &Board) -> Result<()> {
        match board.id {
            Some(id) => get(self.repo.delete(id)).await,
            None => Ok(()),
        }
    }

    fn column_names(&self) -> &'static [&'static str] {
        &["ID", "Host_ID", "URL", "Name"]
    }

    fn column_codes(&self) -> &'static [&'static str] {
        &[Self::ID, Self::HOST_ID, Self::URL, Self::NAME]
    }

    fn extract_data_as_list(&self, board: &Board) -> Vec<FieldValue> {
        vec![
            FieldValue::Id(board.id),
            FieldValue::Id(board.host.id),
            FieldValue::Text(board.url.clone()),
            FieldValue::Text(board.name.clone()),
        ]
    }
}
