use super::{get, BoardLogic, FieldValue, Logic};
use crate::error::{AppError, Result};
use crate::form::{self, parse_id, parse_optional_id, validate_text, FormMap};
use crate::models::Image;
use crate::traits::ImageRepo;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::sync::Arc;

/// Textual date format of the `date` form field, interpreted as UTC.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Typed Image input extracted from a form.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageForm {
    pub id: Option<i32>,
    pub title: String,
    pub url: String,
    pub board_id: i32,
    /// Unparseable dates become the current time instead of an error.
    pub date: DateTime<Utc>,
    pub local_path: String,
}

impl ImageForm {
    pub fn from_form(form: &FormMap) -> Result<Self> {
        let id = parse_optional_id(form)?;
        let title = form.first(ImageLogic::TITLE)?.to_string();
        let url = form.first(ImageLogic::URL)?.to_string();
        let board_id = form.first(ImageLogic::BOARD_ID)?;
        let date = form.first(ImageLogic::DATE)?;
        let local_path = form.first(ImageLogic::LOCAL_PATH)?.to_string();
        Ok(Self {
            id,
            title,
            url,
            board_id: parse_id(ImageLogic::BOARD_ID, board_id)?,
            date: parse_date_or_now(date),
            local_path,
        })
    }

    pub fn validate(&self) -> Result<()> {
        validate_text(ImageLogic::TITLE, &self.title, 1000)?;
        validate_text(ImageLogic::URL, &self.url, 255)?;
        validate_text(ImageLogic::LOCAL_PATH, &self.local_path, 255)
    }
}

fn parse_date_or_now(raw: &str) -> DateTime<Utc> {
    match NaiveDateTime::parse_from_str(raw.trim(), DATE_FORMAT) {
        Ok(naive) => naive.and_utc(),
        Err(e) => {
            log::debug!("unparseable image date {raw:?} ({e}), using current time");
            Utc::now()
        }
    }
}

pub struct ImageLogic {
    repo: Arc<dyn ImageRepo>,
    boards: Arc<BoardLogic>,
}

impl ImageLogic {
    pub const ID: &'static str = form::ID;
    pub const URL: &'static str = "url";
    pub const TITLE: &'static str = "title";
    pub const DATE: &'static str = "date";
    pub const LOCAL_PATH: &'static str = "localPath";
    pub const BOARD_ID: &'static str = "boardId";

    /// The board reference is resolved through `boards`, never through its repository.
    pub fn new(repo: Arc<dyn ImageRepo>, boards: Arc<BoardLogic>) -> Self {
        Self { repo, boards }
    }

    pub async fn get_images_with_board_id(&self, board_id: i32) -> Result<Vec<Image>> {
        get(self.repo.find_by_board_id(board_id)).await
    }

    pub async fn get_images_with_title(&self, title: &str) -> Result<Vec<Image>> {
        get(self.repo.find_by_title(title)).await
    }

    pub async fn get_image_with_url(&self, url: &str) -> Result<Option<Image>> {
        get(self.repo.find_by_url(url)).await
    }

    pub async fn get_image_with_local_path(&self, local_path: &str) -> Result<Option<Image>> {
        get(self.repo.find_by_local_path(local_path)).await
    }

    pub async fn get_images_with_date(&self, date: DateTime<Utc>) -> Result<Vec<Image>> {
        get(self.repo.find_by_date(date)).await
    }

    pub fn convert_date(&self, date: DateTime<Utc>) -> String {
        date.format(DATE_FORMAT).to_string()
    }

    /// Images are never edited in place; an update rebuilds the entity.
    pub async fn update_entity(&self, form: &FormMap) -> Result<Image> {
        self.create_entity(form).await
    }

    /// Creates and stores an image unless one with the submitted url exists.
    pub async fn register(&self, form: &FormMap) -> Result<Image> {
        if let Ok(url) = form.first(Self::URL) {
            if self.get_image_with_url(url).await?.is_some() {
                return Err(AppError::Conflict(format!("Url: \"{url}\" already exists")));
            }
        }
        let image = self.create_entity(form).await?;
        self.add(&image).await
    }
}

#[async_trait]
impl Logic for ImageLogic {
    type Entity = Image;
    const ENTITY: &'static str = "Image";

    async fn get_all(&self) -> Result<Vec<Image>> {
        get(self.repo.find_all()).await
    }

    async fn get_with_id(&self, id: i32) -> Result<Option<Image>> {
        get(self.repo.find_by_id(id)).await
    }

    async fn create_entity(&self, form: &FormMap) -> Result<Image> {
        let input = ImageForm::from_form(form)?;
        input.validate()?;

        let board = self
            .boards
            .get_with_id(input.board_id)
            .await?
            .ok_or(AppError::MissingReference { entity: BoardLogic::ENTITY, id: input.board_id })?;

        Ok(Image {
            id: input.id,
            title: input.title,
            url: input.url,
            local_path: input.local_path,
            date: input.date,
            board,
        })
    }

    async fn add(&self, image: &Image) -> Result<Image> {
        get(self.repo.insert(image)).await
    }

    async fn delete(&self, image: &Image) -> Result<()> {
        match image.id {
            Some(id) => get(self.repo.delete(id)).await,
            None => Ok(()),
        }
    }

    fn column_names(&self) -> &'static [&'static str] {
        &["ID", "BoardID", "Title", "URL", "LocalPath", "Date"]
    }

    fn column_codes(&self) -> &'static [&'static str] {
        &[Self::ID, Self::BOARD_ID, Self::TITLE, Self::URL, Self::LOCAL_PATH, Self::DATE]
    }

    fn extract_data_as_list(&self, image: &Image) -> Vec<FieldValue> {
        vec![
            FieldValue::Id(image.id),
            FieldValue::Id(image.board.id),
            FieldValue::Text(image.title.clone()),
            FieldValue::Text(image.url.clone()),
            FieldValue::Text(image.local_path.clone()),
            FieldValue::Date(image.date),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{fixtures, HostLogic};
    use crate::traits::{MockBoardRepo, MockHostRepo, MockImageRepo};
    use chrono::TimeZone;

    fn boards_with(id: i32) -> Arc<BoardLogic> {
        let mut repo = MockBoardRepo::new();
        repo.expect_find_by_id()
            .returning(move |requested| Ok((requested == id).then(|| fixtures::board(id, 1))));
        let hosts = Arc::new(HostLogic::new(Arc::new(MockHostRepo::new())));
        Arc::new(BoardLogic::new(Arc::new(repo), hosts))
    }

    fn logic(repo: MockImageRepo) -> ImageLogic {
        ImageLogic::new(Arc::new(repo), boards_with(1))
    }

    fn filled() -> FormMap {
        FormMap::from_pairs([
            (ImageLogic::ID, "1"),
            (ImageLogic::TITLE, "JUnit"),
            (ImageLogic::URL, "testUrl"),
            (ImageLogic::LOCAL_PATH, "localPath"),
            (ImageLogic::BOARD_ID, "1"),
            (ImageLogic::DATE, "1970-01-01 00:00:00"),
        ])
    }

    #[tokio::test]
    async fn create_entity_copies_submitted_values() {
        let image = logic(MockImageRepo::new()).create_entity(&filled()).await.unwrap();
        assert_eq!(image.id, Some(1));
        assert_eq!(image.title, "JUnit");
        assert_eq!(image.url, "testUrl");
        assert_eq!(image.local_path, "localPath");
        assert_eq!(image.date, Utc.timestamp_opt(0, 0).unwrap());
        assert_eq!(image.board, fixtures::board(1, 1));
    }

    #[tokio::test]
    async fn null_and_empty_values_are_not_validation_errors() {
        let logic = logic(MockImageRepo::new());
        for key in [ImageLogic::ID, ImageLogic::URL, ImageLogic::LOCAL_PATH, ImageLogic::TITLE] {
            let mut form = filled();
            form.insert(key, vec![]);
            assert_eq!(logic.create_entity(&form).await, Err(AppError::EmptyField(key.into())));

            if key != ImageLogic::ID {
                form.remove(key);
                assert_eq!(logic.create_entity(&form).await, Err(AppError::MissingField(key.into())));
            }
        }
    }

    #[tokio::test]
    async fn bad_lengths_and_ids_are_validation_errors() {
        let logic = logic(MockImageRepo::new());
        let too_long = "a".repeat(2000);
        let cases = [
            (ImageLogic::ID, ""),
            (ImageLogic::ID, "12b"),
            (ImageLogic::LOCAL_PATH, ""),
            (ImageLogic::LOCAL_PATH, too_long.as_str()),
            (ImageLogic::TITLE, ""),
            (ImageLogic::TITLE, too_long.as_str()),
            (ImageLogic::URL, ""),
            (ImageLogic::URL, too_long.as_str()),
        ];
        for (key, value) in cases {
            let mut form = filled();
            form.set(key, value);
            assert!(
                matches!(logic.create_entity(&form).await, Err(AppError::ValidationError(_))),
                "{key}={value:.10} should fail validation"
            );
        }
    }

    #[tokio::test]
    async fn edge_lengths_are_accepted() {
        let logic = logic(MockImageRepo::new());
        for (title, url, path) in [(1, 1, 1), (1000, 255, 255)] {
            let mut form = filled();
            form.set(ImageLogic::TITLE, "t".repeat(title));
            form.set(ImageLogic::URL, "u".repeat(url));
            form.set(ImageLogic::LOCAL_PATH, "p".repeat(path));
            let image = logic.create_entity(&form).await.unwrap();
            assert_eq!(image.title.len(), title);
            assert_eq!(image.url.len(), url);
            assert_eq!(image.local_path.len(), path);
        }
    }

    #[tokio::test]
    async fn unparseable_date_falls_back_to_now() {
        let mut form = filled();
        form.set(ImageLogic::DATE, "Thu Jan 01 00:00:00 UTC 1970");
        let before = Utc::now();
        let image = logic(MockImageRepo::new()).create_entity(&form).await.unwrap();
        assert!(image.date >= before);
        assert!(image.date <= Utc::now());
    }

    #[test]
    fn date_round_trips_through_format() {
        let logic = logic(MockImageRepo::new());
        let date = Utc.with_ymd_and_hms(2021, 3, 14, 15, 9, 26).unwrap();
        let text = logic.convert_date(date);
        assert_eq!(text, "2021-03-14 15:09:26");
        assert_eq!(parse_date_or_now(&text), date);
    }

    #[tokio::test]
    async fn dangling_board_is_reported() {
        let mut form = filled();
        form.set(ImageLogic::BOARD_ID, "5");
        assert_eq!(
            logic(MockImageRepo::new()).create_entity(&form).await,
            Err(AppError::MissingReference { entity: "Board", id: 5 })
        );
    }

    #[tokio::test]
    async fn register_skips_known_urls() {
        let mut repo = MockImageRepo::new();
        repo.expect_find_by_url().returning(|_| Ok(Some(fixtures::image(1, 1))));
        repo.expect_insert().never();
        let err = logic(repo).register(&filled()).await.unwrap_err();
        assert_eq!(err, AppError::Conflict("Url: \"testUrl\" already exists".into()));
    }

    #[test]
    fn extract_data_matches_columns() {
        let logic = logic(MockImageRepo::new());
        let image = fixtures::image(8, 3);
        let row = logic.extract_data_as_list(&image);
        assert_eq!(logic.column_names(), ["ID", "BoardID", "Title", "URL", "LocalPath", "Date"]);
        assert_eq!(
            logic.column_codes(),
            ["id", "boardId", "title", "url", "localPath", "date"]
        );
        assert_eq!(row[0], FieldValue::Id(Some(8)));
        assert_eq!(row[1], FieldValue::Id(Some(3)));
        assert_eq!(row[2], FieldValue::from("JUnit"));
        assert_eq!(row[3], FieldValue::Text(image.url.clone()));
        assert_eq!(row[4], FieldValue::Text(image.local_path.clone()));
        assert_eq!(row[5], FieldValue::Date(image.date));
    }
}
