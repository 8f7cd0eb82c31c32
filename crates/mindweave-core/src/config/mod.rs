use serde_json::{Map, Value, json};

/// Layout, viewport and palette settings, kept as a JSON object so callers can deep-merge
/// partial overrides (e.g. from a `--config` file) over the built-in defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct MindmapConfig(Value);

impl Default for MindmapConfig {
    fn default() -> Self {
        Self(default_config_value())
    }
}

impl MindmapConfig {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Built-in defaults with `overrides` merged on top.
    pub fn with_overrides(overrides: &Value) -> Self {
        let mut cfg = Self::default();
        cfg.deep_merge(overrides);
        cfg
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn get(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.get(dotted_path)?.as_str()
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        let v = self.get(dotted_path)?;
        v.as_f64()
            .or_else(|| v.as_i64().map(|n| n as f64))
            .filter(|n| n.is_finite())
    }

    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        // Configs are objects; coerce anything else so this never panics on user input.
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }

        let Value::Object(ref mut root) = self.0 else {
            return;
        };
        let mut cur: &mut Map<String, Value> = root;
        let mut segments = dotted_path.split('.').peekable();
        while let Some(seg) = segments.next() {
            if segments.peek().is_none() {
                cur.insert(seg.to_string(), value);
                return;
            }
            let slot = cur.entry(seg).or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Some(next) = slot.as_object_mut() else {
                return;
            };
            cur = next;
        }
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

pub fn default_config_value() -> Value {
    json!({
        "layout": {
            "strategy": "hierarchical",
            "nodeWidth": 150.0,
            "baseHeight": 50.0,
            "lineHeight": 16.0,
            "verticalPadding": 24.0,
            "labelInset": 20.0,
            "avgGlyphWidth": 8.0,
            "rowSpacing": 120.0,
            "siblingGap": 24.0,
            "subtreeGap": 24.0,
            "rootRadius": 200.0,
            "levelRadius": 160.0,
            "sectorShrink": 0.8
        },
        "viewport": {
            "minZoom": 0.1,
            "maxZoom": 2.0,
            "wheelFactor": 1.1,
            "buttonFactor": 1.2,
            "fitPadding": 100.0,
            "cullMargin": 100.0
        },
        "interaction": {
            "focusScope": "children"
        },
        "palette": {
            "root": { "fill": "#e2e8f0", "text": "#0f172a" },
            "neutral": { "fill": "#f1f5f9", "text": "#1e293b" },
            "sections": [
                { "fill": "#fef08a", "text": "#713f12" },
                { "fill": "#bae6fd", "text": "#0c4a6e" },
                { "fill": "#a7f3d0", "text": "#064e3b" },
                { "fill": "#fecaca", "text": "#7f1d1d" },
                { "fill": "#ddd6fe", "text": "#4c1d95" },
                { "fill": "#fbcfe8", "text": "#831843" }
            ]
        }
    })
}
