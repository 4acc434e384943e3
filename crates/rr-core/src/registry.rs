//! # Logic Registry
//!
//! Maps an entity name to its logic service so table views can be written
//! against a name. The set of entities is closed; the services are wired
//! once from the injected repositories and shared by handle.

use crate::error::AppError;
use crate::logic::{BoardLogic, HostLogic, ImageLogic, Logic, TableSource};
use crate::traits::{BoardRepo, HostRepo, ImageRepo};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Host,
    Board,
    Image,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Host, EntityKind::Board, EntityKind::Image];

    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Host => HostLogic::ENTITY,
            EntityKind::Board => BoardLogic::ENTITY,
            EntityKind::Image => ImageLogic::ENTITY,
        }
    }
}

impl FromStr for EntityKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| AppError::UnknownEntity(s.to_string()))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone)]
pub struct LogicRegistry {
    hosts: Arc<HostLogic>,
    boards: Arc<BoardLogic>,
    images: Arc<ImageLogic>,
}

impl LogicRegistry {
    /// Wires the services so each reference is resolved through the referenced entity's logic.
    pub fn new(
        host_repo: Arc<dyn HostRepo>,
        board_repo: Arc<dyn BoardRepo>,
        image_repo: Arc<dyn ImageRepo>,
    ) -> Self {
        let hosts = Arc::new(HostLogic::new(host_repo));
        let boards = Arc::new(BoardLogic::new(board_repo, hosts.clone()));
        let images = Arc::new(ImageLogic::new(image_repo, boards.clone()));
        Self { hosts, boards, images }
    }

    pub fn hosts(&self) -> &Arc<HostLogic> {
        &self.hosts
    }

    pub fn boards(&self) -> &Arc<BoardLogic> {
        &self.boards
    }

    pub fn images(&self) -> &Arc<ImageLogic> {
        &self.images
    }

    pub fn table(&self, kind: EntityKind) -> &dyn TableSource {
        match kind {
            EntityKind::Host => self.hosts.as_ref(),
            EntityKind::Board => self.boards.as_ref(),
            EntityKind::Image => self.images.as_ref(),
        }
    }

    /// Resolves a table by entity name, failing with `UnknownEntity` for any other name.
    pub fn table_for(&self, name: &str) -> Result<&dyn TableSource, AppError> {
        Ok(self.table(name.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockBoardRepo, MockHostRepo, MockImageRepo};

    fn registry() -> LogicRegistry {
        LogicRegistry::new(
            Arc::new(MockHostRepo::new()),
            Arc::new(MockBoardRepo::new()),
            Arc::new(MockImageRepo::new()),
        )
    }

    #[test]
    fn names_resolve_to_their_kind() {
        assert_eq!("Board".parse::<EntityKind>().unwrap(), EntityKind::Board);
        assert_eq!("image".parse::<EntityKind>().unwrap(), EntityKind::Image);
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(
            "Post".parse::<EntityKind>(),
            Err(AppError::UnknownEntity("Post".into()))
        );
        assert!(registry().table_for("Account").is_err());
    }

    #[test]
    fn tables_expose_their_entity_columns() {
        let registry = registry();
        let table = registry.table_for("Host").unwrap();
        assert_eq!(table.caption(), "Host");
        assert_eq!(table.codes(), ["id", "name", "url", "extractionType"]);
        assert_eq!(registry.table(EntityKind::Board).headers(), ["ID", "Host_ID", "URL", "Name"]);
    }

    #[tokio::test]
    async fn table_rows_follow_column_order() {
        let mut hosts = MockHostRepo::new();
        hosts
            .expect_find_all()
            .returning(|| Ok(vec![crate::logic::fixtures::host(2)]));
        let registry = LogicRegistry::new(
            Arc::new(hosts),
            Arc::new(MockBoardRepo::new()),
            Arc::new(MockImageRepo::new()),
        );
        let rows = registry.table(EntityKind::Host).rows().await.unwrap();
        let rendered: Vec<String> = rows[0].iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["2", "host-2", "http://h", "json"]);
    }
}
