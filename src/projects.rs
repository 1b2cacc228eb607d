use std::cell::RefCell;
use std::rc::Rc;

use serde::Deserialize;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Document, Element, HtmlElement, Response, Window};

use crate::dom::{listen, query_all, require, set_class};
use crate::error::{PageError, Result};

pub const GRID_SELECTOR: &str = ".projects-grid";
const FILTER_SELECTOR: &str = ".filter-btn[data-filter]";
const EMPTY_MESSAGE: &str = "No projects in this category yet.";
const UNAVAILABLE_MESSAGE: &str = "Projects are unavailable right now.";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Project {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub repo: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ProjectFilter {
    #[default]
    All,
    Category(String),
}

impl ProjectFilter {
    /// `data-filter` value to filter; empty and `all` mean no filtering.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            ProjectFilter::All
        } else {
            ProjectFilter::Category(value.to_string())
        }
    }

    pub fn matches(&self, project: &Project) -> bool {
        match self {
            ProjectFilter::All => true,
            ProjectFilter::Category(name) => {
                project.category.eq_ignore_ascii_case(name)
                    || project.tags.iter().any(|tag| tag.eq_ignore_ascii_case(name))
            }
        }
    }
}

pub fn parse_projects(json: &str) -> Result<Vec<Project>> {
    Ok(serde_json::from_str(json)?)
}

pub fn filter_projects<'a>(projects: &'a [Project], filter: &ProjectFilter) -> Vec<&'a Project> {
    projects.iter().filter(|project| filter.matches(project)).collect()
}

pub async fn fetch_projects(window: &Window, url: &str) -> Result<Vec<Project>> {
    let resp_value = JsFuture::from(window.fetch_with_str(url)).await?;
    let resp: Response = resp_value.dyn_into()?;
    if !resp.ok() {
        return Err(PageError::Http {
            url: url.to_string(),
            status: resp.status(),
        });
    }

    let text = JsFuture::from(resp.text()?).await?;
    parse_projects(&text.as_string().unwrap_or_default())
}

fn child(document: &Document, parent: &Element, tag: &str, class: Option<&str>) -> Result<Element> {
    let el = document.create_element(tag)?;
    if let Some(class) = class {
        el.set_class_name(class);
    }
    parent.append_child(&el)?;
    Ok(el)
}

fn link(document: &Document, parent: &Element, href: &str, label: &str) -> Result<()> {
    let anchor = child(document, parent, "a", Some("project-link"))?;
    anchor.set_attribute("href", href)?;
    anchor.set_attribute("target", "_blank")?;
    anchor.set_attribute("rel", "noopener noreferrer")?;
    anchor.set_text_content(Some(label));
    Ok(())
}

fn render_card(document: &Document, grid: &Element, project: &Project) -> Result<()> {
    let card = child(document, grid, "article", Some("project-card"))?;
    card.set_attribute("data-category", &project.category)?;

    if let Some(src) = &project.image {
        let img = child(document, &card, "img", Some("project-image"))?;
        img.set_attribute("src", src)?;
        img.set_attribute("alt", &project.title)?;
        img.set_attribute("loading", "lazy")?;
    }

    child(document, &card, "h3", Some("project-title"))?.set_text_content(Some(&project.title));
    child(document, &card, "p", Some("project-description"))?
        .set_text_content(Some(&project.description));

    if !project.tags.is_empty() {
        let list = child(document, &card, "ul", Some("project-tags"))?;
        for tag in &project.tags {
            child(document, &list, "li", None)?.set_text_content(Some(tag));
        }
    }

    if project.link.is_some() || project.repo.is_some() {
        let links = child(document, &card, "div", Some("project-links"))?;
        if let Some(href) = &project.link {
            link(document, &links, href, "Live")?;
        }
        if let Some(href) = &project.repo {
            link(document, &links, href, "Code")?;
        }
    }
    Ok(())
}

fn render_message(document: &Document, grid: &Element, message: &str) -> Result<()> {
    grid.set_text_content(None);
    child(document, grid, "p", Some("projects-empty"))?.set_text_content(Some(message));
    Ok(())
}

/// Replaces the grid contents with one card per project. Text always goes in
/// as text nodes, so project data cannot inject markup.
pub fn render(document: &Document, grid: &Element, projects: &[&Project]) -> Result<()> {
    if projects.is_empty() {
        return render_message(document, grid, EMPTY_MESSAGE);
    }

    grid.set_text_content(None);
    for project in projects {
        render_card(document, grid, project)?;
    }
    Ok(())
}

struct Gallery {
    document: Document,
    grid: HtmlElement,
    projects: Vec<Project>,
    filter: ProjectFilter,
}

impl Gallery {
    fn refresh(&self) {
        let visible = filter_projects(&self.projects, &self.filter);
        if let Err(err) = render(&self.document, &self.grid, &visible) {
            log::warn!("projects: render failed: {}", err);
        }
    }
}

/// The `.projects-grid` together with its filter buttons. Clones share the
/// same loaded list and active filter.
#[derive(Clone)]
pub struct ProjectGallery {
    inner: Rc<RefCell<Gallery>>,
}

impl ProjectGallery {
    /// Finds the grid and wires every `.filter-btn[data-filter]`. Filter
    /// clicks re-render whatever has been loaded so far.
    pub fn mount(document: &Document) -> Result<Self> {
        let grid = require(document, GRID_SELECTOR)?;
        let gallery = Self {
            inner: Rc::new(RefCell::new(Gallery {
                document: document.clone(),
                grid,
                projects: Vec::new(),
                filter: ProjectFilter::All,
            })),
        };
        gallery.install_filters(document)?;
        Ok(gallery)
    }

    fn install_filters(&self, document: &Document) -> Result<()> {
        let buttons = query_all(document, FILTER_SELECTOR);
        for button in &buttons {
            let value = button.get_attribute("data-filter").unwrap_or_default();
            let all = buttons.clone();
            let clicked = button.clone();
            let inner = Rc::clone(&self.inner);
            listen(button, "click", move |_event| {
                for other in &all {
                    set_class(other, "active", other == &clicked);
                }
                let mut gallery = inner.borrow_mut();
                gallery.filter = ProjectFilter::parse(&value);
                gallery.refresh();
            })?;
        }
        Ok(())
    }

    pub fn show(&self, projects: Vec<Project>) {
        let mut gallery = self.inner.borrow_mut();
        gallery.projects = projects;
        gallery.refresh();
    }

    pub fn show_unavailable(&self) {
        let gallery = self.inner.borrow();
        if let Err(err) = render_message(&gallery.document, &gallery.grid, UNAVAILABLE_MESSAGE) {
            log::warn!("projects: render failed: {}", err);
        }
    }
}

/// Fetches the project list once and renders it. A failed fetch or decode
/// leaves a short notice in the grid.
pub fn install(window: &Window, document: &Document, url: &str) -> Result<()> {
    let gallery = ProjectGallery::mount(document)?;

    let window = window.clone();
    let url = url.to_string();
    spawn_local(async move {
        match fetch_projects(&window, &url).await {
            Ok(projects) => {
                log::info!("projects: loaded {} from {}", projects.len(), url);
                gallery.show(projects);
            }
            Err(err) => {
                log::warn!("projects: {}", err);
                gallery.show_unavailable();
            }
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "title": "Wandering avatar",
            "description": "Header animation",
            "category": "Web",
            "tags": ["rust", "wasm"],
            "link": "https://example.com/avatar",
            "stars": 12
        },
        {
            "title": "Budget CLI",
            "description": "Terminal budgeting",
            "category": "cli",
            "tags": ["Rust"]
        },
        {
            "title": "Sketchbook",
            "description": "Drawings"
        }
    ]"#;

    fn sample() -> Vec<Project> {
        parse_projects(SAMPLE).unwrap()
    }

    fn titles(projects: &[&Project]) -> Vec<String> {
        projects.iter().map(|p| p.title.clone()).collect()
    }

    #[test]
    fn decodes_optional_fields_and_ignores_unknown_ones() {
        let projects = sample();
        assert_eq!(projects.len(), 3);
        assert_eq!(projects[0].link.as_deref(), Some("https://example.com/avatar"));
        assert_eq!(projects[0].repo, None);
        assert_eq!(projects[2].category, "");
        assert!(projects[2].tags.is_empty());
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        assert!(parse_projects(r#"[{"title": "No description"}]"#).is_err());
        assert!(parse_projects(r#"{"title": "x", "description": "y"}"#).is_err());
    }

    #[test]
    fn all_filter_keeps_everything() {
        let projects = sample();
        for value in ["", "all", " ALL "] {
            let filter = ProjectFilter::parse(value);
            assert_eq!(filter, ProjectFilter::All);
            assert_eq!(filter_projects(&projects, &filter).len(), 3);
        }
    }

    #[test]
    fn category_and_tags_match_case_insensitively() {
        let projects = sample();
        let web = filter_projects(&projects, &ProjectFilter::parse("web"));
        assert_eq!(titles(&web), ["Wandering avatar"]);

        let rust = filter_projects(&projects, &ProjectFilter::parse("rust"));
        assert_eq!(titles(&rust), ["Wandering avatar", "Budget CLI"]);
    }

    #[test]
    fn unknown_category_matches_nothing() {
        let projects = sample();
        assert!(filter_projects(&projects, &ProjectFilter::parse("mobile")).is_empty());
    }
}
