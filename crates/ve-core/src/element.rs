//! The parsed element tree: components, JSX-like children, and attributes.
//!
//! Static paths address this tree. The first UID of a path part names a
//! component's root element; the remaining UIDs walk down through children,
//! conditional clauses, and `map` templates.

use crate::error::{CoreError, CoreResult};
use crate::id::Uid;
use crate::insertion::{ConditionalCase, InsertBehavior, InsertionPath};
use crate::path::{ElementPath, PathPart, StaticElementPath};
use serde::{Deserialize, Serialize};

// ─── Attributes ──────────────────────────────────────────────────────────

/// A chunk of source JavaScript the parser did not interpret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsExpression {
    pub javascript: String,
    /// Free variables the expression references.
    pub defined_elsewhere: Vec<String>,
}

impl JsExpression {
    pub fn new(javascript: impl Into<String>, defined_elsewhere: &[&str]) -> Self {
        Self {
            javascript: javascript.into(),
            defined_elsewhere: defined_elsewhere.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Whether the expression reads `variable` and mentions `usage` verbatim.
    pub fn references(&self, variable: &str, usage: &str) -> bool {
        self.defined_elsewhere.iter().any(|v| v == variable) && self.javascript.contains(usage)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Value(serde_json::Value),
    NestedObject(Vec<ObjectPart>),
    OtherJavascript(JsExpression),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectPart {
    Property { key: String, value: AttributeValue },
    Spread(JsExpression),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: AttributeValue,
}

/// Ordered props as written on an element.
pub type Attributes = Vec<Attribute>;

/// Dotted path into props, e.g. `style.width`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyPath(Vec<String>);

impl PropertyPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn style(prop: &str) -> Self {
        Self::new(["style", prop])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }
}

impl std::fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Look up the value at `path`. Spreads and opaque JavaScript stop the walk.
pub fn get_attribute_at_path<'a>(
    attributes: &'a [Attribute],
    path: &PropertyPath,
) -> Option<&'a AttributeValue> {
    let (first, rest) = path.segments().split_first()?;
    let mut current = &attributes.iter().rev().find(|a| &a.key == first)?.value;
    for segment in rest {
        let AttributeValue::NestedObject(parts) = current else {
            return None;
        };
        current = parts.iter().rev().find_map(|part| match part {
            ObjectPart::Property { key, value } if key == segment => Some(value),
            _ => None,
        })?;
    }
    Some(current)
}

/// Set the value at `path`, creating intermediate object literals.
pub fn set_attribute_at_path(
    attributes: &mut Attributes,
    path: &PropertyPath,
    value: AttributeValue,
) -> CoreResult<()> {
    let Some((first, rest)) = path.segments().split_first() else {
        return Err(CoreError::AttributeNotSettable(path.to_string()));
    };
    let slot = match attributes.iter().rposition(|a| &a.key == first) {
        Some(index) => &mut attributes[index].value,
        None => {
            attributes.push(Attribute {
                key: first.clone(),
                value: AttributeValue::NestedObject(Vec::new()),
            });
            let last = attributes.len() - 1;
            &mut attributes[last].value
        }
    };
    set_in_value(slot, rest, value).map_err(|_| CoreError::AttributeNotSettable(path.to_string()))
}

fn set_in_value(slot: &mut AttributeValue, rest: &[String], value: AttributeValue) -> Result<(), ()> {
    let Some((segment, rest)) = rest.split_first() else {
        *slot = value;
        return Ok(());
    };
    let AttributeValue::NestedObject(parts) = slot else {
        return Err(());
    };
    let existing = parts.iter().rposition(
        |part| matches!(part, ObjectPart::Property { key, .. } if key == segment),
    );
    let index = match existing {
        Some(index) => index,
        None => {
            let placeholder = if rest.is_empty() {
                AttributeValue::Value(serde_json::Value::Null)
            } else {
                AttributeValue::NestedObject(Vec::new())
            };
            parts.push(ObjectPart::Property {
                key: segment.clone(),
                value: placeholder,
            });
            parts.len() - 1
        }
    };
    match &mut parts[index] {
        ObjectPart::Property { value: inner, .. } => set_in_value(inner, rest, value),
        ObjectPart::Spread(_) => Err(()),
    }
}

// ─── Element children ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsxElement {
    pub uid: Uid,
    pub name: String,
    pub props: Attributes,
    pub children: Vec<ElementChild>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsxFragment {
    pub uid: Uid,
    pub children: Vec<ElementChild>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsxConditional {
    pub uid: Uid,
    pub condition: String,
    pub when_true: Box<ElementChild>,
    pub when_false: Box<ElementChild>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpressionValue {
    Null,
    Literal(serde_json::Value),
    /// `collection.map(item => template)`.
    Map {
        collection: String,
        template: Box<ElementChild>,
    },
    Other(JsExpression),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsxExpression {
    pub uid: Uid,
    pub value: ExpressionValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsxText {
    pub uid: Uid,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementChild {
    Element(JsxElement),
    Fragment(JsxFragment),
    Conditional(JsxConditional),
    Expression(JsxExpression),
    Text(JsxText),
}

impl ElementChild {
    pub fn element(uid: &str, name: &str, props: Attributes, children: Vec<ElementChild>) -> Self {
        Self::Element(JsxElement {
            uid: Uid::intern(uid),
            name: name.to_string(),
            props,
            children,
        })
    }

    pub fn fragment(uid: Uid, children: Vec<ElementChild>) -> Self {
        Self::Fragment(JsxFragment { uid, children })
    }

    pub fn null(uid: Uid) -> Self {
        Self::Expression(JsxExpression {
            uid,
            value: ExpressionValue::Null,
        })
    }

    pub fn uid(&self) -> Uid {
        match self {
            Self::Element(e) => e.uid,
            Self::Fragment(f) => f.uid,
            Self::Conditional(c) => c.uid,
            Self::Expression(x) => x.uid,
            Self::Text(t) => t.uid,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(
            self,
            Self::Expression(JsxExpression {
                value: ExpressionValue::Null,
                ..
            })
        )
    }

    /// Elements and fragments hold a children list.
    pub fn is_element_like(&self) -> bool {
        matches!(self, Self::Element(_) | Self::Fragment(_))
    }

    pub fn as_element(&self) -> Option<&JsxElement> {
        match self {
            Self::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Everything a path may step into from here.
    pub fn navigable_children(&self) -> Vec<&ElementChild> {
        match self {
            Self::Element(e) => e.children.iter().collect(),
            Self::Fragment(f) => f.children.iter().collect(),
            Self::Conditional(c) => vec![&*c.when_true, &*c.when_false],
            Self::Expression(JsxExpression {
                value: ExpressionValue::Map { template, .. },
                ..
            }) => vec![&**template],
            Self::Expression(_) | Self::Text(_) => Vec::new(),
        }
    }

    fn navigable_child_mut(&mut self, uid: Uid) -> Option<&mut ElementChild> {
        match self {
            Self::Element(JsxElement { children, .. }) | Self::Fragment(JsxFragment { children, .. }) => {
                children.iter_mut().find(|c| c.uid() == uid)
            }
            Self::Conditional(c) => {
                if c.when_true.uid() == uid {
                    Some(&mut *c.when_true)
                } else if c.when_false.uid() == uid {
                    Some(&mut *c.when_false)
                } else {
                    None
                }
            }
            Self::Expression(JsxExpression {
                value: ExpressionValue::Map { template, .. },
                ..
            }) if template.uid() == uid => Some(&mut **template),
            Self::Expression(_) | Self::Text(_) => None,
        }
    }

    /// All UIDs in this subtree, pre-order.
    pub fn collect_uids(&self, out: &mut Vec<Uid>) {
        out.push(self.uid());
        for child in self.navigable_children() {
            child.collect_uids(out);
        }
    }

    /// Path parts (relative) of this element and all its descendants.
    fn relative_parts(&self, prefix: &PathPart, out: &mut Vec<PathPart>) {
        let mut part = prefix.clone();
        part.push(self.uid());
        out.push(part.clone());
        for child in self.navigable_children() {
            child.relative_parts(&part, out);
        }
    }
}

// ─── Components ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Param {
    Regular { name: String },
    DestructuredObject(Vec<DestructuredPart>),
    DestructuredArray,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestructuredPart {
    /// Field name when aliased (`{ style: s }`); `None` for `{ style }`.
    pub property_name: Option<String>,
    pub param: Param,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    pub param: Option<Param>,
    pub root: ElementChild,
}

impl Component {
    /// Whether the component forwards `style.width` and `style.height` from
    /// its props onto its root element, so resizing an instance works.
    pub fn honours_props_size(&self) -> bool {
        let (Some(param), Some(root)) = (&self.param, self.root.as_element()) else {
            return false;
        };
        let from_style = |prop: &str| {
            property_comes_from_props_style(
                param,
                get_attribute_at_path(&root.props, &PropertyPath::style(prop)),
                prop,
            )
        };
        (from_style("width") && from_style("height")) || props_style_is_spread_into(param, &root.props)
    }

    /// Same as [`honours_props_size`](Self::honours_props_size) for
    /// one horizontal and one vertical pin.
    pub fn honours_props_position(&self) -> bool {
        let (Some(param), Some(root)) = (&self.param, self.root.as_element()) else {
            return false;
        };
        let from_style = |prop: &str| {
            property_comes_from_props_style(
                param,
                get_attribute_at_path(&root.props, &PropertyPath::style(prop)),
                prop,
            )
        };
        ((from_style("left") || from_style("right")) && (from_style("top") || from_style("bottom")))
            || props_style_is_spread_into(param, &root.props)
    }
}

/// Names bound to the whole `style` prop by a destructuring param.
fn style_aliases(parts: &[DestructuredPart]) -> impl Iterator<Item = &str> {
    parts.iter().filter_map(|part| match &part.param {
        Param::Regular { name } => {
            let property = part.property_name.as_deref().unwrap_or(name);
            (property == "style").then_some(name.as_str())
        }
        _ => None,
    })
}

pub fn property_comes_from_props_style(
    param: &Param,
    attribute: Option<&AttributeValue>,
    prop: &str,
) -> bool {
    let Some(AttributeValue::OtherJavascript(js)) = attribute else {
        return false;
    };
    match param {
        Param::Regular { name } => js.references(name, &format!("{name}.style.{prop}")),
        Param::DestructuredObject(parts) => {
            style_aliases(parts).any(|alias| js.references(alias, &format!("{alias}.{prop}")))
        }
        Param::DestructuredArray => false,
    }
}

fn props_style_is_spread_into(param: &Param, attributes: &[Attribute]) -> bool {
    let style = get_attribute_at_path(attributes, &PropertyPath::new(["style"]));
    let check = |variable: &str, usage: &str| match style {
        Some(AttributeValue::OtherJavascript(js)) => js.references(variable, usage),
        Some(AttributeValue::NestedObject(parts)) => parts.iter().any(|part| match part {
            ObjectPart::Spread(js) => js.references(variable, usage),
            ObjectPart::Property { .. } => false,
        }),
        _ => false,
    };
    match param {
        Param::Regular { name } => check(name, &format!("{name}.style")),
        Param::DestructuredObject(parts) => style_aliases(parts).any(|alias| check(alias, alias)),
        Param::DestructuredArray => false,
    }
}

// ─── Tree navigation ─────────────────────────────────────────────────────

/// Find the element at a static path's last part.
pub fn find_element_at_path<'a>(
    components: &'a [Component],
    path: &StaticElementPath,
) -> Option<&'a ElementChild> {
    let part = path.last_part()?;
    let (first, rest) = part.split_first()?;
    let component = components.iter().find(|c| c.root.uid() == *first)?;
    rest.iter().try_fold(&component.root, |current, uid| {
        current.navigable_children().into_iter().find(|c| c.uid() == *uid)
    })
}

fn find_element_mut<'a>(
    components: &'a mut [Component],
    part: &[Uid],
) -> Option<&'a mut ElementChild> {
    let (first, rest) = part.split_first()?;
    let component = components.iter_mut().find(|c| c.root.uid() == *first)?;
    rest.iter()
        .try_fold(&mut component.root, |current, uid| current.navigable_child_mut(*uid))
}

/// Run `f` on the element at `path`, failing when it does not exist.
pub fn transform_at_path<R>(
    components: &mut [Component],
    path: &StaticElementPath,
    f: impl FnOnce(&mut ElementChild) -> CoreResult<R>,
) -> CoreResult<R> {
    let element = path
        .last_part()
        .and_then(|part| find_element_mut(components, part))
        .ok_or_else(|| CoreError::ElementNotFound(path.to_string()))?;
    f(element)
}

/// Every UID in every component, pre-order.
pub fn all_uids_in_components(components: &[Component]) -> Vec<Uid> {
    let mut out = Vec::new();
    for component in components {
        component.root.collect_uids(&mut out);
    }
    out
}

// ─── Tree edits ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexPosition {
    Front,
    Back,
    Absolute(usize),
    After(usize),
    Before(usize),
}

/// Concrete insertion index into a list of `len` children, clamped.
pub fn pick_index_position(len: usize, position: IndexPosition) -> usize {
    match position {
        IndexPosition::Front => 0,
        IndexPosition::Back => len,
        IndexPosition::Absolute(i) | IndexPosition::Before(i) => i,
        IndexPosition::After(i) => i + 1,
    }
    .min(len)
}

/// Insert `elements` at `target`, returning the paths of everything
/// inserted.
pub fn insert_children(
    components: &mut [Component],
    target: &InsertionPath,
    elements: Vec<ElementChild>,
    position: Option<IndexPosition>,
) -> CoreResult<Vec<ElementPath>> {
    let parent_path = target.intended_parent().clone();
    transform_at_path(components, &parent_path.to_static(), |parent| match target {
        InsertionPath::Child { .. } => {
            let children = match parent {
                ElementChild::Element(JsxElement { children, .. })
                | ElementChild::Fragment(JsxFragment { children, .. }) => children,
                _ => return Err(CoreError::ParentDoesNotSupportChildren),
            };
            let mut relative = Vec::new();
            for element in &elements {
                element.relative_parts(&PathPart::new(), &mut relative);
            }
            match position {
                None => children.extend(elements),
                Some(position) => {
                    let index = pick_index_position(children.len(), position);
                    children.splice(index..index, elements);
                }
            }
            Ok(relative
                .into_iter()
                .map(|part| part.iter().fold(parent_path.clone(), |p, uid| p.append(*uid)))
                .collect())
        }
        InsertionPath::ConditionalClause {
            clause, behavior, ..
        } => {
            let ElementChild::Conditional(conditional) = parent else {
                return Err(CoreError::ParentNotConditional);
            };
            let slot = match clause {
                ConditionalCase::TrueCase => &mut conditional.when_true,
                ConditionalCase::FalseCase => &mut conditional.when_false,
            };
            if elements.is_empty() {
                return Err(CoreError::EmptyInsertion);
            }
            let inserted = elements
                .iter()
                .map(|e| target.element_path_for(e.uid()))
                .collect::<Vec<_>>();
            match behavior {
                InsertBehavior::ReplaceWithSingleElement => {
                    let mut elements = elements.into_iter();
                    let (Some(single), None) = (elements.next(), elements.next()) else {
                        return Err(CoreError::ConditionalSlotTakesSingleChild);
                    };
                    **slot = single;
                    Ok(inserted[..1].to_vec())
                }
                InsertBehavior::ReplaceWithElementsWrappedInFragment { fragment_uid } => {
                    **slot = ElementChild::fragment(*fragment_uid, elements);
                    Ok(inserted)
                }
                InsertBehavior::WrapInFragmentAndAppendElements { fragment_uid } => {
                    if slot.is_null() {
                        return Err(CoreError::WrapNullInFragment);
                    }
                    let previous = std::mem::replace(&mut **slot, ElementChild::null(*fragment_uid));
                    let mut children = elements;
                    children.push(previous);
                    **slot = ElementChild::fragment(*fragment_uid, children);
                    Ok(inserted)
                }
            }
        }
    })
}

/// Reorder the children of `target` to match `rearranged`, which must name
/// every existing child exactly once.
pub fn rearrange_children(
    components: &mut [Component],
    target: &StaticElementPath,
    rearranged: &[StaticElementPath],
) -> CoreResult<()> {
    transform_at_path(components, target, |parent| {
        let children = match parent {
            ElementChild::Element(JsxElement { children, .. })
            | ElementChild::Fragment(JsxFragment { children, .. }) => children,
            _ => return Ok(()),
        };
        if children.len() != rearranged.len() {
            return Err(CoreError::RearrangeCountMismatch {
                existing: children.len(),
                requested: rearranged.len(),
            });
        }
        let mut reordered = Vec::with_capacity(children.len());
        for path in rearranged {
            let uid = path.to_uid();
            let child = children
                .iter()
                .find(|c| Some(c.uid()) == uid)
                .ok_or_else(|| CoreError::RearrangeMissingChild(path.to_string()))?;
            reordered.push(child.clone());
        }
        *children = reordered;
        Ok(())
    })
}

/// Remove the element at `target`. Component roots and conditional clauses
/// are replaced with `null` instead. Returns whether anything changed.
pub fn remove_child(components: &mut [Component], target: &StaticElementPath) -> bool {
    let Some(target_uid) = target.to_uid() else {
        return false;
    };
    let Some(part) = target.last_part() else {
        return false;
    };
    if part.len() == 1 {
        return match components.iter_mut().find(|c| c.root.uid() == target_uid) {
            Some(component) => {
                component.root = ElementChild::null(target_uid);
                true
            }
            None => false,
        };
    }
    let Some(parent) = find_element_mut(components, &part[..part.len() - 1]) else {
        return false;
    };
    remove_from(parent, target_uid, true)
}

fn remove_from(parent: &mut ElementChild, uid: Uid, descend: bool) -> bool {
    let children = match parent {
        ElementChild::Element(JsxElement { children, .. }) if descend => children,
        ElementChild::Fragment(JsxFragment { children, .. }) => children,
        ElementChild::Conditional(c) => {
            let mut changed = false;
            for clause in [&mut c.when_true, &mut c.when_false] {
                if clause.uid() == uid && !clause.is_null() {
                    **clause = ElementChild::null(uid);
                    changed = true;
                }
            }
            return changed;
        }
        _ => return false,
    };
    let before = children.len();
    children.retain(|c| c.uid() != uid);
    let mut changed = children.len() != before;
    for child in children.iter_mut() {
        changed |= remove_from(child, uid, false);
    }
    changed
}

// ─── Test fixtures ───────────────────────────────────────────────────────

/// `style={{ ... }}` built from literal pairs.
pub fn style_props(pairs: &[(&str, serde_json::Value)]) -> Attributes {
    vec![Attribute {
        key: "style".to_string(),
        value: AttributeValue::NestedObject(
            pairs
                .iter()
                .map(|(k, v)| ObjectPart::Property {
                    key: k.to_string(),
                    value: AttributeValue::Value(v.clone()),
                })
                .collect(),
        ),
    }]
}
