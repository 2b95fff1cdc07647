//! G1 (Globo) news.

use crate::adapter::{LinkRule, SiteRules};

pub const G1_SOURCE: &str = "g1";

pub static G1: SiteRules = SiteRules {
    source: G1_SOURCE,
    default_base_url: "https://g1.globo.com",
    search_path,
    links: &[
        LinkRule {
            selector: ".widget--info__text-container a",
            path_marker: Some("/noticia/"),
        },
        LinkRule {
            selector: "a[href*='/noticia/']",
            path_marker: Some("/noticia/"),
        },
    ],
    title: &["h1.content-head__title", "h1"],
    summary: &[".content-head__subtitle", "h2.content-head__subtitle"],
    content: &[".mc-article-body p", "article p"],
    author: &[".content-publication-data__from", "address"],
    author_prefix: Some("Por"),
    published: &["time[datetime]"],
    image: &[".content-media__image img", "figure img"],
};

fn search_path(query: &str) -> String {
    format!("/busca/?q={query}&order=recent")
}
