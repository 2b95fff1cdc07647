//! CNN Brasil news.

use crate::adapter::{LinkRule, SiteRules};

pub const CNN_SOURCE: &str = "cnn";

pub static CNN: SiteRules = SiteRules {
    source: CNN_SOURCE,
    default_base_url: "https://www.cnnbrasil.com.br",
    search_path,
    links: &[
        LinkRule {
            selector: "a.home__list__tag",
            path_marker: None,
        },
        LinkRule {
            selector: "article a[href*='cnnbrasil.com.br']",
            path_marker: None,
        },
        LinkRule {
            selector: ".news-item a, .post-item a, h2 a, h3 a",
            path_marker: Some("/noticia"),
        },
    ],
    title: &["h1.post__title", "h1"],
    summary: &[".post__excerpt", "h2.post__excerpt"],
    content: &[".post__content p", "article .content p"],
    author: &[".author__name", ".post__author"],
    author_prefix: None,
    published: &["time[datetime]", ".post__data time"],
    image: &[".post__thumbnail img", "figure img"],
};

fn search_path(query: &str) -> String {
    format!("/?s={query}&orderby=date")
}
