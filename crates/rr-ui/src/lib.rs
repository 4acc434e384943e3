//! # rr-ui
//!
//! Askama templates for the Rusty-Reader pages. Handlers prepare the plain
//! view structs below; the templates only lay them out.

pub use askama::Template;

pub struct Link {
    pub label: String,
    pub href: String,
}

impl Link {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self { label: label.into(), href: href.into() }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub links: Vec<Link>,
}

/// A table with its header row repeated below the data.
#[derive(Template)]
#[template(path = "table.html")]
pub struct TableTemplate {
    pub title: String,
    pub caption: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// `Key=k, Value/s=[..]` lines of the request parameters
    pub submitted: Vec<String>,
}

pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self { value: value.into(), label: label.into() }
    }
}

/// One input of a create form. A field with options renders as a dropdown.
pub struct FormField {
    pub name: String,
    pub label: String,
    pub options: Vec<SelectOption>,
    pub value: String,
}

impl FormField {
    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            options: Vec::new(),
            value: String::new(),
        }
    }

    pub fn select(name: impl Into<String>, label: impl Into<String>, options: Vec<SelectOption>) -> Self {
        Self { options, ..Self::text(name, label) }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn is_select(&self) -> bool {
        !self.options.is_empty()
    }
}

#[derive(Template)]
#[template(path = "form.html")]
pub struct FormTemplate {
    pub title: String,
    pub action: String,
    pub fields: Vec<FormField>,
    pub error: Option<String>,
    pub table_href: String,
    pub submitted: Vec<String>,
}

pub struct GalleryItem {
    pub title: String,
    pub full_url: String,
    pub thumb_url: String,
    pub board: String,
    pub date: String,
}

#[derive(Template)]
#[template(path = "gallery.html")]
pub struct GalleryTemplate {
    pub title: String,
    pub items: Vec<GalleryItem>,
    /// Outcome of an ingestion pass run by this request
    pub summary: Option<String>,
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_repeats_headers_and_escapes_cells() {
        let html = TableTemplate {
            title: "Host Table".into(),
            caption: "Host".into(),
            headers: vec!["ID".into(), "Name".into()],
            rows: vec![vec!["1".into(), "<b>reddit</b>".into()]],
            submitted: vec!["Key=sort, Value/s=[top]".into()],
        }
        .render()
        .unwrap();

        assert_eq!(html.matches("<th>Name</th>").count(), 2);
        assert!(html.contains("&lt;b&gt;reddit&lt;/b&gt;"));
        assert!(html.contains("Key=sort, Value"));
        assert!(html.contains("[top]"));
    }

    #[test]
    fn form_renders_dropdowns_and_inline_error() {
        let html = FormTemplate {
            title: "Create Board".into(),
            action: "/CreateBoard".into(),
            fields: vec![
                FormField::select("hostId", "Host", vec![SelectOption::new("1", "reddit"), SelectOption::new("2", "imgur")])
                    .with_value("2"),
                FormField::text("url", "URL").with_value("https://www.reddit.com/r/pics"),
            ],
            error: Some("Url: \"x\" already exists".into()),
            table_href: "/BoardTable".into(),
            submitted: Vec::new(),
        }
        .render()
        .unwrap();

        assert!(html.contains(r#"<select id="hostId" name="hostId">"#));
        assert!(html.contains(r#"<option value="2" selected>imgur</option>"#));
        assert!(html.contains(r#"<option value="1">reddit</option>"#));
        assert!(html.contains(r#"name="url" value="https:"#));
        assert!(html.contains("www.reddit.com"));
        assert!(html.contains(r#"<p class="error">Url: "#));
        assert!(html.contains("already exists"));
        assert!(!html.contains("Submitted request parameters"));
    }

    #[test]
    fn empty_gallery_says_so() {
        let html = GalleryTemplate {
            title: "Images".into(),
            items: Vec::new(),
            summary: None,
            errors: Vec::new(),
        }
        .render()
        .unwrap();
        assert!(html.contains("No images yet."));
    }

    #[test]
    fn gallery_links_thumbnails_to_full_images() {
        let html = GalleryTemplate {
            title: "Images".into(),
            items: vec![GalleryItem {
                title: "A cat".into(),
                full_url: "/ImageDelivery/cat.jpg".into(),
                thumb_url: "/ImageDelivery/thumb_cat.jpg.webp".into(),
                board: "pics".into(),
                date: "2020-05-01 12:00:00".into(),
            }],
            summary: Some("2 added".into()),
            errors: vec!["download failed".into()],
        }
        .render()
        .unwrap();

        assert!(html.contains("cat.jpg\"><img src="));
        assert!(html.contains("thumb_cat.jpg.webp"));
        assert!(html.contains("2 added"));
        assert!(html.contains("download failed"));
    }
}
