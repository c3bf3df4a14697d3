//! Property patching for a single element.

use serde_json::Value;
use vode_dom::NodeId;

use super::Renderer;
use crate::error::Result;
use crate::helpers::{class_string, style_key, style_value, truthy};
use crate::props::{Handler, Prop, Props, CATCH, ON_MOUNT, ON_UNMOUNT};

impl Renderer<'_> {
    /// Bring the live properties of `node` from `old` to `new`.
    ///
    /// Only keys whose value changed are touched. Returns the applied map,
    /// which becomes the baseline of the next render.
    pub(super) fn patch_properties(
        &mut self,
        node: NodeId,
        old: Option<&Props>,
        new: Option<Props>,
    ) -> Result<Option<Props>> {
        if let Some(old) = old {
            for (key, old_value) in old.iter() {
                let new_value = new.as_ref().and_then(|props| props.get(key));
                if new_value.is_some_and(|value| value.same(old_value)) {
                    continue;
                }
                self.patch_property(node, key, Some(old_value), new_value)?;
            }
        }

        if let Some(new) = &new {
            for (key, value) in new.iter() {
                if old.is_some_and(|old| old.contains_key(key)) {
                    continue;
                }
                self.patch_property(node, key, None, Some(value))?;
            }
        }

        Ok(new)
    }

    fn patch_property(&mut self, node: NodeId, key: &str, old: Option<&Prop>, new: Option<&Prop>) -> Result<()> {
        match key {
            ON_MOUNT | ON_UNMOUNT | CATCH => Ok(()),
            "style" => self.patch_style(node, old.and_then(Prop::as_value), new.and_then(Prop::as_value)),
            "class" => match new.and_then(Prop::as_value).filter(|value| truthy(value)) {
                Some(class) => Ok(self.doc.set_attribute(node, "class", &class_string(class))?),
                None => Ok(self.doc.remove_attribute(node, "class")?),
            },
            _ if key.starts_with("on") => {
                let listener = match new {
                    Some(Prop::Handler(handler)) => Some(handler.clone()),
                    Some(Prop::Value(patch @ (Value::Object(_) | Value::Array(_)))) => {
                        Some(Handler::literal(patch.clone()))
                    }
                    _ => None,
                };
                Ok(self.doc.set_listener(node, &key[2..], listener)?)
            }
            _ => self.patch_attribute(node, key, new.and_then(Prop::as_value)),
        }
    }

    fn patch_style(&mut self, node: NodeId, old: Option<&Value>, new: Option<&Value>) -> Result<()> {
        match new {
            None => self.doc.set_css_text(node, "")?,
            Some(value) if !truthy(value) => self.doc.set_css_text(node, "")?,
            Some(Value::String(text)) => {
                if old.and_then(Value::as_str) != Some(text.as_str()) {
                    self.doc.set_css_text(node, text)?;
                }
            }
            Some(Value::Object(styles)) => match old {
                Some(Value::Object(previous)) => {
                    let removed = previous.keys().filter(|key| !styles.contains_key(*key));
                    for key in styles.keys().chain(removed) {
                        let value = styles.get(key);
                        if value == previous.get(key) {
                            continue;
                        }
                        let css = value.and_then(style_value);
                        self.doc.set_style_property(node, &style_key(key), css.as_deref())?;
                    }
                }
                _ => {
                    if old.is_some() {
                        self.doc.set_css_text(node, "")?;
                    }
                    for (key, value) in styles {
                        let css = style_value(value);
                        self.doc.set_style_property(node, &style_key(key), css.as_deref())?;
                    }
                }
            },
            Some(_) => {}
        }
        Ok(())
    }

    /// Plain properties: written as a DOM property on non-namespaced
    /// elements and reflected as an attribute.
    fn patch_attribute(&mut self, node: NodeId, key: &str, value: Option<&Value>) -> Result<()> {
        let reflect_property = self.doc.namespace(node).is_none();
        match value {
            None | Some(Value::Null) | Some(Value::Bool(false)) => {
                if reflect_property {
                    let previous = self.doc.property(node, key).cloned();
                    if previous.is_some_and(|value| !value.is_null()) {
                        self.doc.set_property(node, key, Value::Null)?;
                    }
                }
                self.doc.remove_attribute(node, key)?;
            }
            Some(value) => {
                if reflect_property {
                    self.doc.set_property(node, key, value.clone())?;
                }
                self.doc.set_attribute(node, key, &attribute_text(value))?;
            }
        }
        Ok(())
    }
}

fn attribute_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => String::new(),
        other => other.to_string(),
    }
}
