use rustc_hash::FxHashMap;
use web_sys::HtmlElement;

use super::scope::DomScope;
use crate::timeline::{PropertySink, PropertyValue, TargetKey};

/// Transform channels composed into one `transform` declaration.
#[derive(Debug, Clone, Copy, Default)]
struct Transform {
    x: Option<f64>,
    y: Option<f64>,
    hold_y: Option<f64>,
    scale: Option<f64>,
}

impl Transform {
    fn set(&mut self, property: &str, value: Option<f64>) -> bool {
        match property {
            "x" | "translateX" => self.x = value,
            "y" => self.y = value,
            "translateY" => self.hold_y = value,
            "scale" => self.scale = value,
            _ => return false,
        }
        true
    }

    fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.hold_y.is_none() && self.scale.is_none()
    }

    fn css(&self) -> String {
        let dy = self.y.unwrap_or(0.0) + self.hold_y.unwrap_or(0.0);
        let mut css = format!(
            "translate3d({}px, {dy}px, 0px)",
            self.x.unwrap_or(0.0)
        );
        if let Some(scale) = self.scale {
            css.push_str(&format!(" scale({scale})"));
        }
        css
    }
}

/// `backgroundColor` → `background-color`.
fn css_name(property: &str) -> String {
    let mut name = String::with_capacity(property.len() + 4);
    for c in property.chars() {
        if c.is_ascii_uppercase() {
            name.push('-');
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}

/// Writes values as inline styles.
///
/// Positional channels (`x`, `y`, `scale`, the pin hold offset) share the
/// element's `transform`; everything else maps to the kebab-cased CSS
/// property.
pub struct StyleSink {
    scope: DomScope,
    transforms: FxHashMap<TargetKey, Transform>,
}

impl StyleSink {
    /// Sink writing to the elements of `scope`.
    #[must_use]
    pub fn new(scope: DomScope) -> Self {
        Self {
            scope,
            transforms: FxHashMap::default(),
        }
    }

    fn element(&self, target: &TargetKey) -> Option<HtmlElement> {
        self.scope.nth_html(&target.selector, target.index)
    }

    fn apply_transform(&self, element: &HtmlElement, transform: &Transform) {
        let style = element.style();
        let result = if transform.is_empty() {
            style.remove_property("transform").map(|_| ())
        } else {
            style.set_property("transform", &transform.css())
        };
        if result.is_err() {
            log::warn!("could not update transform");
        }
    }
}

impl PropertySink for StyleSink {
    fn write(&mut self, target: &TargetKey, property: &str, value: PropertyValue) {
        let Some(element) = self.element(target) else {
            return;
        };
        let mut transform = self.transforms.get(target).copied().unwrap_or_default();
        if transform.set(property, value.as_scalar()) {
            self.apply_transform(&element, &transform);
            let _ = self.transforms.insert(target.clone(), transform);
            return;
        }
        if element
            .style()
            .set_property(&css_name(property), &value.to_string())
            .is_err()
        {
            log::warn!("{target}: could not set {property}");
        }
    }

    fn revert(&mut self, target: &TargetKey, property: &str) {
        let Some(element) = self.element(target) else {
            return;
        };
        if let Some(transform) = self.transforms.get_mut(target) {
            if transform.set(property, None) {
                let transform = *transform;
                if transform.is_empty() {
                    let _ = self.transforms.remove(target);
                }
                self.apply_transform(&element, &transform);
                return;
            }
        }
        let _ = element.style().remove_property(&css_name(property));
    }
}
