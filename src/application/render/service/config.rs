use std::collections::HashSet;

use ammonia::Builder as AmmoniaBuilder;
use comrak::options::{ListStyleType, Options};

use crate::config::RendererSettings;

pub(crate) fn default_options() -> Options<'static> {
    options_for(&RendererSettings::default())
}

pub(crate) fn options_for(settings: &RendererSettings) -> Options<'static> {
    let mut options = Options::default();
    configure_extensions(&mut options, settings);
    options
}

/// Allow-list used by the ammonia-backed save filter. Keeps the markup the
/// renderer emits, including footnote anchors and task-list inputs.
pub(crate) fn build_content_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    let tags: HashSet<&'static str> = HashSet::from([
        "a",
        "abbr",
        "blockquote",
        "br",
        "code",
        "del",
        "div",
        "em",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "hr",
        "i",
        "img",
        "input",
        "li",
        "ol",
        "p",
        "pre",
        "s",
        "section",
        "span",
        "strong",
        "sub",
        "sup",
        "table",
        "tbody",
        "td",
        "th",
        "thead",
        "tr",
        "ul",
    ]);
    builder.tags(tags);

    let generic: HashSet<&'static str> = HashSet::from([
        "class",
        "id",
        "title",
        "lang",
        "dir",
        "data-footnote-ref",
        "data-footnotes",
        "data-footnote-backref",
        "data-footnote-backref-idx",
    ]);
    builder.generic_attributes(generic);

    builder.add_tag_attributes("img", &["title", "width", "height", "alt"]);
    builder.add_tag_attributes("code", &["data-language"]);
    builder.add_tag_attributes("pre", &["lang", "data-language"]);
    builder.add_tag_attributes("th", &["align", "colspan", "rowspan", "scope"]);
    builder.add_tag_attributes("td", &["align", "colspan", "rowspan"]);
    builder.add_tag_attributes("input", &["type", "checked", "disabled"]);

    builder.add_url_schemes(["http", "https", "mailto", "tel"].iter().copied());

    builder
}

fn configure_extensions(options: &mut Options<'static>, settings: &RendererSettings) {
    let ext = &mut options.extension;
    ext.strikethrough = settings.strikethrough;
    ext.tagfilter = false;
    ext.table = settings.tables;
    ext.autolink = settings.autolink;
    ext.tasklist = settings.tasklist;
    ext.footnotes = settings.footnotes;
    ext.superscript = false;

    let render = &mut options.render;
    render.github_pre_lang = true;
    render.full_info_string = true;
    render.tasklist_classes = settings.tasklist;
    render.list_style = ListStyleType::Dash;
    render.r#unsafe = settings.unsafe_html;
    render.sourcepos = false;
}
