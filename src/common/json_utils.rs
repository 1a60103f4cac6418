// src/common/json_utils.rs

use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};

use crate::common::error::DraftError;

// ---
// Caminhos de campo ("empreendedor.nome", "modulo4.materiasPrimas[2].nome")
// ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// Aceita tanto `a.b[2].c` quanto `a.b.2.c`.
    pub fn parse(raw: &str) -> Result<Self, DraftError> {
        let invalid = || DraftError::InvalidPath(raw.to_string());

        if raw.trim().is_empty() {
            return Err(invalid());
        }

        let mut segments = Vec::new();
        for part in raw.split('.') {
            if part.is_empty() {
                return Err(invalid());
            }

            // Parte puramente numérica vira índice
            if part.bytes().all(|b| b.is_ascii_digit()) {
                let index = part.parse::<usize>().map_err(|_| invalid())?;
                segments.push(PathSegment::Index(index));
                continue;
            }

            let (key, mut rest) = match part.find('[') {
                Some(pos) => (&part[..pos], &part[pos..]),
                None => (part, ""),
            };
            if key.is_empty() || key.contains(']') {
                return Err(invalid());
            }
            segments.push(PathSegment::Key(key.to_string()));

            // Um ou mais "[n]" depois da chave
            while !rest.is_empty() {
                let close = rest.find(']').ok_or_else(invalid)?;
                if !rest.starts_with('[') {
                    return Err(invalid());
                }
                let index = rest[1..close].parse::<usize>().map_err(|_| invalid())?;
                segments.push(PathSegment::Index(index));
                rest = &rest[close + 1..];
            }
        }

        Ok(Self(segments))
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_key(&self, key: &str) -> bool {
        matches!(self.0.as_slice(), [PathSegment::Key(k)] if k == key)
    }

    /// Primeira chave do caminho (`activity` em `activity.x`).
    pub fn root_key(&self) -> Option<&str> {
        match self.0.first() {
            Some(PathSegment::Key(k)) => Some(k.as_str()),
            _ => None,
        }
    }

    /// Caminho sem índices, usado para casar com os templates (`modulo4.tanques`).
    pub fn without_indices(&self) -> String {
        self.0
            .iter()
            .filter_map(|s| match s {
                PathSegment::Key(k) => Some(k.as_str()),
                PathSegment::Index(_) => None,
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(k) if i == 0 => write!(f, "{}", k)?,
                PathSegment::Key(k) => write!(f, ".{}", k)?,
                PathSegment::Index(n) => write!(f, "[{}]", n)?,
            }
        }
        Ok(())
    }
}

pub fn get_path<'a>(root: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.segments() {
        current = match segment {
            PathSegment::Key(k) => current.as_object()?.get(k)?,
            PathSegment::Index(n) => current.as_array()?.get(*n)?,
        };
    }
    Some(current)
}

/// Atalho para caminhos estáticos dos templates. Caminho mal formado = ausente.
pub fn get_str_path<'a>(root: &'a Value, raw: &str) -> Option<&'a Value> {
    FieldPath::parse(raw).ok().and_then(|p| get_path(root, &p))
}

pub fn get_path_mut<'a>(root: &'a mut Value, path: &FieldPath) -> Result<&'a mut Value, DraftError> {
    let mut current = root;
    for (depth, segment) in path.segments().iter().enumerate() {
        let here = || FieldPath(path.segments()[..depth].to_vec()).to_string();
        current = match segment {
            PathSegment::Key(k) => {
                // Objetos intermediários ausentes são criados, como no formulário
                if current.is_null() {
                    *current = Value::Object(Map::new());
                }
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| DraftError::NotAnObject(here()))?;
                obj.entry(k.clone()).or_insert(Value::Null)
            }
            PathSegment::Index(n) => {
                let arr = current
                    .as_array_mut()
                    .ok_or_else(|| DraftError::NotAnArray(here()))?;
                let len = arr.len();
                arr.get_mut(*n).ok_or(DraftError::IndexOutOfBounds {
                    path: here(),
                    index: *n,
                    len,
                })?
            }
        };
    }
    Ok(current)
}

/// Como `get_path_mut`, mas não cria nada: caminho ausente é erro e o
/// documento fica intacto.
pub fn get_existing_mut<'a>(root: &'a mut Value, path: &FieldPath) -> Result<&'a mut Value, DraftError> {
    let mut current = root;
    for (depth, segment) in path.segments().iter().enumerate() {
        let upto = |end: usize| FieldPath(path.segments()[..end].to_vec()).to_string();
        current = match segment {
            PathSegment::Key(k) => current
                .as_object_mut()
                .and_then(|obj| obj.get_mut(k))
                .ok_or_else(|| DraftError::InvalidPath(upto(depth + 1)))?,
            PathSegment::Index(n) => {
                let arr = current
                    .as_array_mut()
                    .ok_or_else(|| DraftError::NotAnArray(upto(depth)))?;
                let len = arr.len();
                arr.get_mut(*n).ok_or_else(|| DraftError::IndexOutOfBounds {
                    path: upto(depth),
                    index: *n,
                    len,
                })?
            }
        };
    }
    Ok(current)
}

pub fn set_path(root: &mut Value, path: &FieldPath, value: Value) -> Result<(), DraftError> {
    let slot = get_path_mut(root, path)?;
    *slot = value;
    Ok(())
}

// ---
// Merge profundo (carga = merge(padrões, armazenado))
// ---

/// O documento armazenado vence, exceto onde ele é `null`: ali o padrão
/// mantém o formato. Arrays são posicionais e vêm inteiros do armazenado.
pub fn deep_merge(defaults: Value, stored: Value) -> Value {
    match (defaults, stored) {
        (Value::Object(mut base), Value::Object(incoming)) => {
            for (key, value) in incoming {
                let merged = match base.remove(&key) {
                    Some(default_value) => deep_merge(default_value, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Object(base)
        }
        (default_value, Value::Null) => default_value,
        (_, stored) => stored,
    }
}

// ---
// Limpeza antes de gravar
// ---

/// Remove recursivamente "", [], {} e null. Retorna `None` quando o próprio
/// valor some.
pub fn prune_empty(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::Array(items) => {
            let kept: Vec<Value> = items.iter().filter_map(prune_empty).collect();
            (!kept.is_empty()).then_some(Value::Array(kept))
        }
        Value::Object(fields) => {
            let kept: Map<String, Value> = fields
                .iter()
                .filter_map(|(k, v)| prune_empty(v).map(|v| (k.clone(), v)))
                .collect();
            (!kept.is_empty()).then_some(Value::Object(kept))
        }
        other => Some(other.clone()),
    }
}

/// "Vazio" no sentido do formulário: o campo ainda não foi preenchido.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(fields)) => fields.is_empty(),
        Some(_) => false,
    }
}

// ---
// Datas
// ---

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Converte as formas em que uma data aparece no armazenamento
/// (ISO, RFC 3339, dd/mm/aaaa, epoch em ms, `{seconds, nanoseconds}`) para
/// `YYYY-MM-DD`. Valores irreconhecíveis voltam inalterados.
pub fn coerce_date(value: &Value) -> Value {
    let date = match value {
        Value::String(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
            .or_else(|| NaiveDate::parse_from_str(s, "%d/%m/%Y").ok()),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| dt.date_naive()),
        Value::Object(fields) => {
            let seconds = fields
                .get("seconds")
                .or_else(|| fields.get("_seconds"))
                .and_then(Value::as_i64);
            // Nanossegundos fora de u32 tornam o valor irreconhecível
            let nanos = match fields.get("nanoseconds").or_else(|| fields.get("_nanoseconds")) {
                None => Some(0),
                Some(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            };
            seconds
                .zip(nanos)
                .and_then(|(s, n)| DateTime::from_timestamp(s, n))
                .map(|dt| dt.date_naive())
        }
        _ => None,
    };

    match date {
        Some(d) => Value::String(d.format(DATE_FORMAT).to_string()),
        None => value.clone(),
    }
}

/// `documento_referencia` -> `documentoReferencia`
pub fn to_camel_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut upper_next = false;
    for c in raw.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
