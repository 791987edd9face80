#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Modifier {
    Ctrl,
    Alt,
    Shift,
    Super,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Function(u8),
    Char(char),
}

/// A parsed, canonicalized hotkey. `name()` is the stable spelling used for
/// idempotence checks and for the first-run notification label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accelerator {
    name: String,
    modifiers: Vec<Modifier>,
    key: Key,
}

impl Accelerator {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_label(&self) -> &str {
        &self.name
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    pub fn key(&self) -> Key {
        self.key
    }
}

pub fn parse_accelerator(input: &str) -> Result<Accelerator, String> {
    let raw_parts: Vec<&str> = input
        .split('+')
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect();

    if raw_parts.len() < 2 {
        return Err("Hotkey must include at least one modifier and one key.".to_string());
    }

    let key = normalize_key(raw_parts[raw_parts.len() - 1])?;

    let mut modifiers: Vec<Modifier> = Vec::new();
    for part in &raw_parts[..raw_parts.len() - 1] {
        let modifier = normalize_modifier(part)?;
        if !modifiers.contains(&modifier) {
            modifiers.push(modifier);
        }
    }
    modifiers.sort();

    let name = canonical_name(&modifiers, key);
    Ok(Accelerator {
        name,
        modifiers,
        key,
    })
}

fn normalize_modifier(input: &str) -> Result<Modifier, String> {
    match input.to_ascii_lowercase().as_str() {
        "ctrl" | "control" | "primary" => Ok(Modifier::Ctrl),
        "alt" => Ok(Modifier::Alt),
        "shift" => Ok(Modifier::Shift),
        "super" | "meta" | "win" => Ok(Modifier::Super),
        _ => Err(format!(
            "Unsupported modifier '{input}'. Use Ctrl, Alt, Shift, or Super."
        )),
    }
}

fn normalize_key(input: &str) -> Result<Key, String> {
    let raw = input.trim();
    if raw.is_empty() {
        return Err("Hotkey key is required.".to_string());
    }

    let upper = raw.to_ascii_uppercase();
    if upper == "SPACE" {
        return Ok(Key::Space);
    }

    if let Some(number) = upper.strip_prefix('F') {
        if let Ok(parsed) = number.parse::<u8>() {
            if (1..=24).contains(&parsed) {
                return Ok(Key::Function(parsed));
            }
        }
        return Err("Function key must be between F1 and F24.".to_string());
    }

    if upper.len() == 1 {
        let c = upper.chars().next().unwrap_or_default();
        if c.is_ascii_alphanumeric() {
            return Ok(Key::Char(c));
        }
    }

    Err("Key must be A-Z, 0-9, Space, or F1-F24.".to_string())
}

fn canonical_name(modifiers: &[Modifier], key: Key) -> String {
    let mut parts: Vec<String> = modifiers
        .iter()
        .map(|modifier| modifier_label(*modifier).to_string())
        .collect();
    parts.push(key_label(key));
    parts.join("+")
}

fn modifier_label(modifier: Modifier) -> &'static str {
    match modifier {
        Modifier::Ctrl => "Ctrl",
        Modifier::Alt => "Alt",
        Modifier::Shift => "Shift",
        Modifier::Super => "Super",
    }
}

fn key_label(key: Key) -> String {
    match key {
        Key::Space => "Space".to_string(),
        Key::Function(n) => format!("F{n}"),
        Key::Char(c) => c.to_string(),
    }
}
