use comrak::plugins::syntect::SyntectAdapter;
use comrak::{ComrakOptions, ComrakPlugins, markdown_to_html_with_plugins};
use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};

const LIST_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:short] [day padding:none], [hour repr:12 padding:zero]:[minute padding:zero] [period case:upper]");

const MESSAGE_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour repr:12 padding:zero]:[minute padding:zero] [period case:upper]");

fn markdown_options() -> ComrakOptions {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.footnotes = true;
    options.extension.strikethrough = true;
    options.extension.tasklist = true;
    options
}

pub fn markdown_to_html(md: &str) -> String {
    let adapter = SyntectAdapter::new(Some("base16-ocean.dark"));
    let mut plugins = ComrakPlugins::default();
    plugins.render.codefence_syntax_highlighter = Some(&adapter);
    markdown_to_html_with_plugins(md, &markdown_options(), &plugins)
}

fn format_local(unix_secs: i64, format: &[FormatItem<'_>]) -> Option<String> {
    let mut datetime = OffsetDateTime::from_unix_timestamp(unix_secs).ok()?;
    if let Ok(offset) = UtcOffset::current_local_offset() {
        datetime = datetime.to_offset(offset);
    }
    datetime.format(format).ok()
}

/// Local wall-clock label for a unix timestamp, `None` when out of range.
pub fn format_updated_at(unix_secs: i64) -> Option<String> {
    format_local(unix_secs, LIST_TIME_FORMAT)
}

pub fn format_message_time(unix_secs: Option<i64>) -> Option<String> {
    format_local(unix_secs?, MESSAGE_TIME_FORMAT)
}
