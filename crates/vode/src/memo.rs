//! Memoized components.

use serde_json::Value;
use smallvec::SmallVec;

use crate::attached::AttachedVode;
use crate::error::Result;
use crate::vode::{Component, Vode};
use crate::State;

/// Comparison key of a memoized component or property map.
///
/// Keys compare element by element with JSON value equality, which takes the
/// place of reference identity.
pub type MemoKey = SmallVec<[Value; 4]>;

pub fn memo_key<I, V>(values: I) -> MemoKey
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    values.into_iter().map(Into::into).collect()
}

/// Whether two keys have the same length and pairwise equal elements.
#[inline]
pub fn same_key(a: &MemoKey, b: &MemoKey) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
}

/// A component that only re-renders when `key` changes.
///
/// ```
/// use vode::{memo, Vode};
/// use serde_json::json;
///
/// let row = memo([json!(1), json!("title")], |_| Vode::element("li").child("title").into());
/// assert!(matches!(row, Vode::Component(_)));
/// ```
pub fn memo<I, V>(key: I, f: impl Fn(&State) -> Vode + 'static) -> Vode
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    Vode::Component(Component::new(f).with_key(memo_key(key)))
}

/// Outcome of [`remember`].
#[derive(Debug)]
pub(crate) enum Remembered {
    /// Keys match: keep the previous attached subtree as is
    Past,
    /// A resolved vode (never a component) and the key to stamp it with
    Fresh { vode: Vode, key: Option<MemoKey> },
}

/// Resolve a child against the previous render at the same position.
pub(crate) fn remember(state: &State, present: Vode, past: Option<&AttachedVode>) -> Result<Remembered> {
    let Vode::Component(component) = present else {
        return Ok(Remembered::Fresh {
            vode: present,
            key: None,
        });
    };

    if let (Some(present_key), Some(past_key)) = (component.key(), past.and_then(|p| p.memo.as_ref())) {
        if same_key(present_key, past_key) {
            return Ok(Remembered::Past);
        }
    }

    let key = component.key().cloned();
    let vode = unwrap(state, &component)?;
    Ok(Remembered::Fresh { vode, key })
}

/// Invoke a component, and again for as long as it returns components.
pub(crate) fn unwrap(state: &State, component: &Component) -> Result<Vode> {
    let mut vode = component.call(state)?;
    while let Vode::Component(next) = vode {
        vode = next.call(state)?;
    }
    Ok(vode)
}
