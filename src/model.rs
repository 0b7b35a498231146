use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;

/// Decode a field, treating a value of the wrong JSON shape as absent.
fn lenient<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = serde_json::Value::deserialize(d)?;
    if v.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(v).ok())
}

/// Integers arrive as numbers or numeric strings depending on the endpoint.
fn lenient_int<'de, D>(d: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(d)?;
    Ok(match v {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

fn lenient_text<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(d)?;
    Ok(match v {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Lowercase + trim, the normalization used for every vocabulary lookup.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceResult {
    #[serde(default, deserialize_with = "lenient_int")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DegreeLevel {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Major {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub degree_level: Option<DegreeLevel>,
}

impl Major {
    /// `"<major> · <level>"` as shown in the registrations table.
    pub fn display_label(&self) -> String {
        let name = self.name.as_deref().unwrap_or("");
        let level = self
            .degree_level
            .as_ref()
            .and_then(|l| l.name.as_deref())
            .unwrap_or("");
        format!("{name} · {level}").trim().to_string()
    }

    /// Space-separated form used by course search.
    pub fn search_label(&self) -> String {
        let name = self.name.as_deref().unwrap_or("");
        let level = self
            .degree_level
            .as_ref()
            .and_then(|l| l.name.as_deref())
            .unwrap_or("");
        format!("{name} {level}").trim().to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(default, deserialize_with = "lenient_int")]
    pub number: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub surname: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub major: Option<Major>,
}

/// An exam registration as delivered by the exam service.
///
/// Every field is optional: the accessors in [`crate::extract`] define what a
/// missing field sorts as.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[serde(default, deserialize_with = "lenient")]
    pub student: Option<Student>,
    #[serde(default, deserialize_with = "lenient")]
    pub result: Option<ReferenceResult>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
}

impl Registration {
    /// Decode without ever failing; anything that is not an object is an
    /// empty registration.
    pub fn from_json(v: &serde_json::Value) -> Self {
        serde_json::from_value(v.clone()).unwrap_or_default()
    }

    pub fn student_number(&self) -> Option<i64> {
        self.student.as_ref().and_then(|s| s.number)
    }

    /// Grades can be changed while the status is one of `editable`
    /// (compared normalized).
    pub fn is_editable<S: AsRef<str>>(&self, editable: &[S]) -> bool {
        let status = normalize(self.status.as_deref().unwrap_or(""));
        !status.is_empty() && editable.iter().any(|e| normalize(e.as_ref()) == status)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Professor {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub surname: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(default, deserialize_with = "lenient_int")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub cfu: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub professor: Option<Professor>,
    #[serde(default, deserialize_with = "lenient")]
    pub majors: Option<Vec<Major>>,
}

impl Course {
    pub fn from_json(v: &serde_json::Value) -> Self {
        serde_json::from_value(v.clone()).unwrap_or_default()
    }
}
