// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! JSON object that refuses repeated keys.
//!
//! `serde_json::Value` and `BTreeMap` keep the last of two equal keys; a
//! revision document with a repeated repository must fail instead.

use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;

/// Ordered object entries with unique keys.
#[derive(Debug)]
pub(crate) struct StrictMap<V>(pub(crate) Vec<(String, V)>);

impl<'de, V> Deserialize<'de> for StrictMap<V>
where
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(StrictVisitor(PhantomData))
    }
}

struct StrictVisitor<V>(PhantomData<V>);

impl<'de, V> Visitor<'de> for StrictVisitor<V>
where
    V: Deserialize<'de>,
{
    type Value = StrictMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(key) = map.next_key::<String>()? {
            if !seen.insert(key.clone()) {
                return Err(de::Error::custom(format_args!("duplicate key '{key}'")));
            }
            let value = map.next_value::<V>()?;
            entries.push((key, value));
        }
        Ok(StrictMap(entries))
    }
}
