#![forbid(unsafe_code)]

//! Student list filter.
//!
//! On every key release in the filter input, each item of the list is shown
//! when its label contains the query (case-insensitively) and hidden
//! otherwise. An empty query shows everything. Items are re-queried on every
//! application, so rows rendered after the filter was attached are covered.

use std::rc::Rc;

use pycs_dom::class_list::validate_token;
use pycs_dom::{Document, DomError, EventListener, EventTarget, EventType, NodeId, Selector};

use crate::config::FilterConfig;

/// A lowercased filter query.
///
/// ```
/// use pycs_widgets::filter::FilterQuery;
///
/// let query = FilterQuery::new("ANN");
/// assert!(query.matches("Annabelle"));
/// assert!(!query.matches("Bob"));
/// assert!(FilterQuery::new("").matches("anything"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterQuery {
    normalized: String,
}

impl FilterQuery {
    /// Normalize `raw` input text.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self {
            normalized: raw.to_lowercase(),
        }
    }

    /// The lowercased query.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// Whether the query is empty (matches every label).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Whether the lowercased `label` contains the query.
    #[must_use]
    pub fn matches(&self, label: &str) -> bool {
        self.is_empty() || label.to_lowercase().contains(&self.normalized)
    }
}

/// Result of one filter application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    /// The normalized query that was applied.
    pub query: String,
    /// Items left visible.
    pub shown: usize,
    /// Items hidden.
    pub hidden: usize,
}

impl FilterOutcome {
    /// Number of items examined.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.shown + self.hidden
    }
}

/// Host operations the filter logic needs.
pub trait FilterSurface {
    /// Host item handle.
    type Item;
    /// Host error type.
    type Error;

    /// Current text of the filter input.
    fn query(&self) -> Result<String, Self::Error>;

    /// The items to filter, freshly queried.
    fn items(&self) -> Result<Vec<Self::Item>, Self::Error>;

    /// Label of `item`, `None` when the attribute is missing.
    fn label(&self, item: &Self::Item) -> Result<Option<String>, Self::Error>;

    /// Add (`true`) or remove (`false`) the hidden class on `item`.
    fn set_hidden(&mut self, item: &Self::Item, hidden: bool) -> Result<(), Self::Error>;
}

/// Apply the current query to every item. Items without a label are treated
/// as having an empty one.
pub fn apply_filter<S: FilterSurface>(surface: &mut S) -> Result<FilterOutcome, S::Error> {
    let query = FilterQuery::new(&surface.query()?);
    let mut outcome = FilterOutcome {
        query: query.as_str().to_owned(),
        ..FilterOutcome::default()
    };
    for item in surface.items()? {
        let label = surface.label(&item)?.unwrap_or_default();
        let show = query.matches(&label);
        surface.set_hidden(&item, !show)?;
        if show {
            outcome.shown += 1;
        } else {
            outcome.hidden += 1;
        }
    }
    Ok(outcome)
}

struct DocumentFilter<'a> {
    doc: &'a mut Document,
    shared: &'a FilterShared,
}

impl FilterSurface for DocumentFilter<'_> {
    type Item = NodeId;
    type Error = DomError;

    fn query(&self) -> Result<String, DomError> {
        self.doc.value(self.shared.input).map(ToOwned::to_owned)
    }

    fn items(&self) -> Result<Vec<NodeId>, DomError> {
        Ok(self.doc.query_selector_all(&self.shared.item_selector))
    }

    fn label(&self, item: &NodeId) -> Result<Option<String>, DomError> {
        self.doc.attribute(*item, &self.shared.label_attribute)
    }

    fn set_hidden(&mut self, item: &NodeId, hidden: bool) -> Result<(), DomError> {
        if hidden {
            self.doc.class_add(*item, &self.shared.hidden_class)
        } else {
            self.doc.class_remove(*item, &self.shared.hidden_class)
        }
    }
}

#[derive(Debug)]
struct FilterShared {
    input: NodeId,
    item_selector: Selector,
    label_attribute: String,
    hidden_class: String,
}

impl FilterShared {
    fn apply(&self, doc: &mut Document) -> Result<FilterOutcome, DomError> {
        let mut surface = DocumentFilter { doc, shared: self };
        let outcome = apply_filter(&mut surface)?;

        #[cfg(feature = "tracing")]
        Self::trace_apply(&outcome);

        Ok(outcome)
    }

    #[cfg(feature = "tracing")]
    fn trace_apply(outcome: &FilterOutcome) {
        let _span = tracing::debug_span!(
            "filter.apply",
            query = outcome.query.as_str(),
            shown = outcome.shown,
            hidden = outcome.hidden
        )
        .entered();
    }
}

/// List filter attached to an in-memory [`Document`].
#[derive(Debug)]
pub struct ListFilter {
    shared: Rc<FilterShared>,
    listener: EventListener,
}

impl ListFilter {
    /// Register the key-release handler on `input`.
    ///
    /// Fails if `input` is not an `input`/`textarea`, if the item selector
    /// does not parse, or if the hidden class is not a valid token.
    pub fn attach(doc: &mut Document, input: NodeId, config: &FilterConfig) -> Result<Self, DomError> {
        doc.value(input)?;
        validate_token(&config.hidden_class)?;
        let item_selector = Selector::parse(&config.item_selector)?;

        let shared = Rc::new(FilterShared {
            input,
            item_selector,
            label_attribute: config.label_attribute.clone(),
            hidden_class: config.hidden_class.clone(),
        });
        let handler = Rc::clone(&shared);
        let listener = EventListener::new(move |doc, _event| handler.apply(doc).map(|_| ()));
        doc.add_event_listener(EventTarget::Node(input), EventType::KeyUp, &listener)?;

        Ok(Self { shared, listener })
    }

    /// Apply the current input value now, without waiting for a key release.
    pub fn apply(&self, doc: &mut Document) -> Result<FilterOutcome, DomError> {
        self.shared.apply(doc)
    }

    /// The filter input.
    #[must_use]
    pub fn input_node(&self) -> NodeId {
        self.shared.input
    }

    /// The key-release handler.
    #[must_use]
    pub fn listener(&self) -> &EventListener {
        &self.listener
    }

    /// Remove the key-release handler. Item classes are left as they are.
    pub fn detach(self, doc: &mut Document) {
        doc.remove_event_listener(
            EventTarget::Node(self.shared.input),
            EventType::KeyUp,
            &self.listener,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use pycs_dom::ElementSpec;

    fn roster(names: &[&str]) -> (Document, NodeId, Vec<NodeId>, ListFilter) {
        let mut doc = Document::new();
        let body = doc.body();
        let input = doc
            .append(
                body,
                ElementSpec::new("input").attr("data-script", "filterStudents"),
            )
            .unwrap();
        let list = doc.append(body, ElementSpec::new("div").class("ass-list")).unwrap();
        let items = names
            .iter()
            .map(|name| {
                doc.append(
                    list,
                    ElementSpec::new("div")
                        .class("ass-list__ass")
                        .attr("data-student-name", *name),
                )
                .unwrap()
            })
            .collect();
        let filter = ListFilter::attach(&mut doc, input, &FilterConfig::default()).unwrap();
        (doc, input, items, filter)
    }

    fn visible(doc: &Document, items: &[NodeId]) -> Vec<bool> {
        items
            .iter()
            .map(|&item| !doc.has_class(item, "hidden").unwrap())
            .collect()
    }

    #[test]
    fn query_normalizes_case() {
        let query = FilterQuery::new("AnN");
        assert_eq!(query.as_str(), "ann");
        assert!(query.matches("ANNA"));
        assert!(query.matches("joANNe"));
        assert!(!query.matches("An"));
    }

    #[test]
    fn empty_query_matches_everything() {
        let query = FilterQuery::new("");
        assert!(query.is_empty());
        assert!(query.matches(""));
        assert!(query.matches("Bob"));
    }

    #[test]
    fn non_ascii_labels_are_case_folded() {
        assert!(FilterQuery::new("émi").matches("Émile"));
        assert!(FilterQuery::new("ÖZ").matches("özge"));
    }

    #[test]
    fn typing_filters_scenario_roster() {
        let (mut doc, input, items, _filter) = roster(&["Anna", "Bob", "Annabelle"]);
        doc.type_text(input, "ann").unwrap();
        assert_eq!(visible(&doc, &items), vec![true, false, true]);
    }

    #[test]
    fn clearing_the_query_shows_everything_again() {
        let (mut doc, input, items, _filter) = roster(&["Anna", "Bob"]);
        doc.type_text(input, "z").unwrap();
        assert_eq!(visible(&doc, &items), vec![false, false]);
        doc.backspace(input).unwrap();
        assert_eq!(visible(&doc, &items), vec![true, true]);
    }

    #[test]
    fn apply_reports_counts() {
        let (mut doc, input, _items, filter) = roster(&["Anna", "Bob", "Annabelle"]);
        doc.set_value(input, "BEL").unwrap();
        let outcome = filter.apply(&mut doc).unwrap();
        assert_eq!(
            outcome,
            FilterOutcome {
                query: "bel".to_owned(),
                shown: 1,
                hidden: 2,
            }
        );
        assert_eq!(outcome.total(), 3);
    }

    #[test]
    fn missing_label_counts_as_empty() {
        let (mut doc, input, items, filter) = roster(&["Anna"]);
        let list = doc.parent(items[0]).unwrap().unwrap();
        let unlabeled = doc
            .append(list, ElementSpec::new("div").class("ass-list__ass"))
            .unwrap();
        assert_eq!(filter.apply(&mut doc).unwrap().shown, 2);
        doc.set_value(input, "a").unwrap();
        filter.apply(&mut doc).unwrap();
        assert!(doc.has_class(unlabeled, "hidden").unwrap());
    }

    #[test]
    fn items_added_after_attach_are_filtered() {
        let (mut doc, input, _items, _filter) = roster(&["Anna"]);
        let body = doc.body();
        let late = doc
            .append(
                body,
                ElementSpec::new("div")
                    .class("ass-list__ass")
                    .attr("data-student-name", "Zed"),
            )
            .unwrap();
        doc.type_text(input, "ann").unwrap();
        assert!(doc.has_class(late, "hidden").unwrap());
    }

    #[test]
    fn non_items_are_untouched() {
        let (mut doc, input, _items, _filter) = roster(&["Anna"]);
        let body = doc.body();
        let bystander = doc
            .append(body, ElementSpec::new("div").attr("data-student-name", "Bob"))
            .unwrap();
        doc.type_text(input, "ann").unwrap();
        assert!(!doc.has_class(bystander, "hidden").unwrap());
    }

    #[test]
    fn click_events_do_not_filter() {
        let (mut doc, input, items, _filter) = roster(&["Anna", "Bob"]);
        doc.set_value(input, "ann").unwrap();
        doc.click(input).unwrap();
        assert_eq!(visible(&doc, &items), vec![true, true]);
    }

    #[test]
    fn attach_requires_form_control() {
        let mut doc = Document::new();
        let body = doc.body();
        let div = doc.append(body, ElementSpec::new("div")).unwrap();
        assert_eq!(
            ListFilter::attach(&mut doc, div, &FilterConfig::default()).unwrap_err(),
            DomError::NotFormControl(div)
        );
    }

    #[test]
    fn attach_rejects_bad_selector() {
        let mut doc = Document::new();
        let body = doc.body();
        let input = doc.append(body, ElementSpec::new("input")).unwrap();
        let config = FilterConfig {
            item_selector: "li:hover".to_owned(),
            ..FilterConfig::default()
        };
        assert!(matches!(
            ListFilter::attach(&mut doc, input, &config),
            Err(DomError::InvalidSelector(_))
        ));
        assert_eq!(doc.total_listener_count(), 0);
    }

    #[test]
    fn detach_stops_filtering() {
        let (mut doc, input, items, filter) = roster(&["Anna", "Bob"]);
        assert_eq!(filter.input_node(), input);
        filter.detach(&mut doc);
        doc.type_text(input, "ann").unwrap();
        assert_eq!(visible(&doc, &items), vec![true, true]);
        assert_eq!(doc.total_listener_count(), 0);
    }

    #[test]
    fn textarea_inputs_are_supported() {
        let mut doc = Document::new();
        let body = doc.body();
        let input = doc.append(body, ElementSpec::new("textarea")).unwrap();
        let item = doc
            .append(
                body,
                ElementSpec::new("p")
                    .class("ass-list__ass")
                    .attr("data-student-name", "Bob"),
            )
            .unwrap();
        ListFilter::attach(&mut doc, input, &FilterConfig::default()).unwrap();
        doc.type_text(input, "x").unwrap();
        assert!(doc.has_class(item, "hidden").unwrap());
    }
}
