use crate::display::activity_label;
use crate::models::{ActivityType, StatsResponse};
use askama::Template;

/// The single page: add form, recent list, range controls and chart.
#[derive(Template)]
#[template(path = "index.html")]
struct IndexPage<'a> {
    options: Vec<TypeOption>,
    stats: &'a StatsResponse,
}

struct TypeOption {
    value: String,
    label: String,
}

pub fn render_index(stats: &StatsResponse) -> Result<String, askama::Error> {
    let options = ActivityType::KNOWN
        .iter()
        .map(|kind| TypeOption {
            value: kind.as_str().to_string(),
            label: activity_label(kind).to_string(),
        })
        .collect();

    IndexPage { options, stats }.render()
}
