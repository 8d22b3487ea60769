//! End-to-end scenarios on page layouts rendered by the PyCS templates.

use pretty_assertions::assert_eq;
use pycs_dom::{Document, ElementSpec, NodeId, Selector};
use pycs_widgets::{PageConfig, PageElements, PageScript};

/// Layout of the class roster page: nav bar, filter box and assignment rows.
struct RosterPage {
    doc: Document,
    button: NodeId,
    menu: NodeId,
    menu_link: NodeId,
    input: NodeId,
}

fn roster_page(students: &[&str]) -> RosterPage {
    let mut doc = Document::new();
    let body = doc.body();
    let nav = doc.append(body, ElementSpec::new("nav").class("nav")).unwrap();
    let button = doc
        .append(
            nav,
            ElementSpec::new("button")
                .id("navMenuButton")
                .class("nav__button"),
        )
        .unwrap();
    let menu = doc
        .append(nav, ElementSpec::new("ul").id("navMenu").class("nav__menu"))
        .unwrap();
    let entry = doc.append(menu, ElementSpec::new("li")).unwrap();
    let menu_link = doc
        .append(entry, ElementSpec::new("a").attr("href", "/logout"))
        .unwrap();

    let main = doc.append(body, ElementSpec::new("main")).unwrap();
    doc.append(main, ElementSpec::new("h1")).unwrap();
    let input = doc
        .append(
            main,
            ElementSpec::new("input")
                .attr("type", "text")
                .attr("data-script", "filterStudents"),
        )
        .unwrap();
    let list = doc
        .append(main, ElementSpec::new("div").class("ass-list"))
        .unwrap();
    for name in students {
        let row = doc
            .append(
                list,
                ElementSpec::new("div")
                    .class("ass-list__ass")
                    .attr("data-student-name", *name),
            )
            .unwrap();
        doc.append(row, ElementSpec::new("span")).unwrap();
    }
    RosterPage {
        doc,
        button,
        menu,
        menu_link,
        input,
    }
}

fn visible_names(doc: &Document) -> Vec<String> {
    let rows = Selector::parse(".ass-list > .ass-list__ass").unwrap();
    doc.query_selector_all(&rows)
        .into_iter()
        .filter(|&row| !doc.has_class(row, "hidden").unwrap())
        .map(|row| doc.attribute(row, "data-student-name").unwrap().unwrap())
        .collect()
}

#[test]
fn roster_page_filters_students_while_menu_works() {
    let mut page = roster_page(&["Anna", "Bob", "Annabelle"]);
    let script = PageScript::install_discovered(&mut page.doc, &PageConfig::default()).unwrap();
    assert!(script.menu().is_some());
    assert!(script.filter().is_some());

    page.doc.type_text(page.input, "ann").unwrap();
    assert_eq!(visible_names(&page.doc), vec!["Anna", "Annabelle"]);

    page.doc.click(page.button).unwrap();
    assert!(page.doc.has_class(page.menu, "nav__menu--visible").unwrap());
    page.doc.click(page.menu_link).unwrap();
    assert!(page.doc.has_class(page.menu, "nav__menu--visible").unwrap());

    // Clicking into the filter box closes the menu and leaves the filter alone.
    page.doc.click(page.input).unwrap();
    assert!(!page.doc.has_class(page.menu, "nav__menu--visible").unwrap());
    assert_eq!(visible_names(&page.doc), vec!["Anna", "Annabelle"]);
}

#[test]
fn student_page_without_filter_only_gets_menu() {
    let mut doc = Document::new();
    let body = doc.body();
    let button = doc
        .append(body, ElementSpec::new("button").id("navMenuButton"))
        .unwrap();
    doc.append(body, ElementSpec::new("ul").id("navMenu")).unwrap();

    let script = PageScript::install_discovered(&mut doc, &PageConfig::default()).unwrap();
    assert!(script.menu().is_some());
    assert!(script.filter().is_none());
    assert!(doc.click(button).unwrap().is_clean());
}

#[test]
fn login_page_without_any_hooks_loads_cleanly() {
    let mut doc = Document::new();
    let body = doc.body();
    let form = doc.append(body, ElementSpec::new("form")).unwrap();
    let field = doc
        .append(form, ElementSpec::new("input").attr("name", "username"))
        .unwrap();

    let script = PageScript::install_discovered(&mut doc, &PageConfig::default()).unwrap();
    assert!(script.menu().is_none());
    assert!(script.filter().is_none());
    assert_eq!(doc.total_listener_count(), 0);
    assert!(doc.type_text(field, "bob").unwrap().iter().all(|o| o.listeners_invoked == 0));
}

#[test]
fn prefilled_query_applies_on_demand() {
    let mut page = roster_page(&["Anna", "Bob"]);
    page.doc.set_value(page.input, "bo").unwrap();
    let script = PageScript::install_discovered(&mut page.doc, &PageConfig::default()).unwrap();
    assert_eq!(visible_names(&page.doc), vec!["Anna", "Bob"]);

    let outcome = script.filter().unwrap().apply(&mut page.doc).unwrap();
    assert_eq!((outcome.shown, outcome.hidden), (1, 1));
    assert_eq!(visible_names(&page.doc), vec!["Bob"]);
}

#[test]
fn custom_hooks_from_json() {
    let mut doc = Document::new();
    let body = doc.body();
    let button = doc.append(body, ElementSpec::new("button").id("burger")).unwrap();
    let menu = doc.append(body, ElementSpec::new("aside").id("drawer")).unwrap();
    let input = doc.append(body, ElementSpec::new("textarea").id("search")).unwrap();
    let row = doc
        .append(
            body,
            ElementSpec::new("li")
                .class("row")
                .attr("data-name", "Carol"),
        )
        .unwrap();

    let config = PageConfig::from_json(
        r##"{
            "menu": {"toggle_id": "burger", "menu_id": "drawer", "visible_class": "open"},
            "filter": {"input_selector": "#search", "item_selector": "li.row",
                       "label_attribute": "data-name", "hidden_class": "is-hidden"}
        }"##,
    )
    .unwrap();
    let elements = PageElements::discover(&doc, &config).unwrap();
    assert_eq!(
        elements,
        PageElements {
            toggle: Some(button),
            menu: Some(menu),
            filter_input: Some(input),
        }
    );

    let _script = PageScript::install(&mut doc, elements, &config).unwrap();
    doc.click(button).unwrap();
    assert!(doc.has_class(menu, "open").unwrap());
    doc.type_text(input, "x").unwrap();
    assert!(doc.has_class(row, "is-hidden").unwrap());
    assert!(!doc.has_class(row, "hidden").unwrap());
}

#[test]
fn detached_page_is_inert() {
    let mut page = roster_page(&["Anna", "Bob"]);
    let script = PageScript::install_discovered(&mut page.doc, &PageConfig::default()).unwrap();
    script.detach(&mut page.doc);

    page.doc.click(page.button).unwrap();
    page.doc.type_text(page.input, "zz").unwrap();
    assert!(!page.doc.has_class(page.menu, "nav__menu--visible").unwrap());
    assert_eq!(visible_names(&page.doc), vec!["Anna", "Bob"]);
    assert_eq!(page.doc.total_listener_count(), 0);
}

#[test]
fn filter_hook_on_non_input_leaves_menu_working() {
    let mut doc = Document::new();
    let body = doc.body();
    let button = doc
        .append(body, ElementSpec::new("button").id("navMenuButton"))
        .unwrap();
    let menu = doc.append(body, ElementSpec::new("ul").id("navMenu")).unwrap();
    let picker = doc
        .append(
            body,
            ElementSpec::new("select").attr("data-script", "filterStudents"),
        )
        .unwrap();

    let script = PageScript::install_discovered(&mut doc, &PageConfig::default()).unwrap();
    assert!(script.menu().is_some());
    assert!(script.filter().is_none());

    doc.click(button).unwrap();
    assert!(doc.has_class(menu, "nav__menu--visible").unwrap());
    doc.click(picker).unwrap();
    assert!(!doc.has_class(menu, "nav__menu--visible").unwrap());
    assert!(doc.key_up(picker, "a").unwrap().is_clean());
}

#[test]
fn orphaned_toggle_leaves_filter_working() {
    let mut doc = Document::new();
    let body = doc.body();
    let button = doc
        .append(body, ElementSpec::new("button").id("navMenuButton"))
        .unwrap();
    let input = doc
        .append(
            body,
            ElementSpec::new("input").attr("data-script", "filterStudents"),
        )
        .unwrap();
    let list = doc
        .append(body, ElementSpec::new("div").class("ass-list"))
        .unwrap();
    for name in ["Anna", "Bob"] {
        doc.append(
            list,
            ElementSpec::new("div")
                .class("ass-list__ass")
                .attr("data-student-name", name),
        )
        .unwrap();
    }

    let script = PageScript::install_discovered(&mut doc, &PageConfig::default()).unwrap();
    assert!(script.menu().is_none());
    assert!(script.filter().is_some());

    assert_eq!(doc.click(button).unwrap().listeners_invoked, 0);
    doc.type_text(input, "bo").unwrap();
    assert_eq!(visible_names(&doc), vec!["Bob"]);
}
