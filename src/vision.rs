use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::anthropic;
use crate::search::TutorialVideo;

/// Diagnosis instructions for the vision model. The reply must be bare JSON
/// in Hebrew; videoSearchQuery drives the tutorial-video lookup downstream.
const DIAGNOSIS_PROMPT: &str = r#"אתה מומחה לתיקוני בית בישראל. המשתמש שלח לך תמונה של בעיה בבית.

נתח את התמונה וספק תשובה בפורמט JSON בלבד (ללא markdown, ללא backticks):

{
  "problem": "תיאור קצר של הבעיה שזיהית",
  "canDIY": true/false,
  "difficultyScore": 1-10,
  "difficultyText": "קל/בינוני/מורכב/צריך איש מקצוע",
  "timeEstimate": "זמן משוער לתיקון",
  "videoSearchQuery": "איך להחליף מחסנית ברז במטבח",
  "steps": ["צעד 1...", "צעד 2...", "צעד 3..."],
  "tools": ["כלי 1", "כלי 2"],
  "materials": [{"item": "שם הפריט", "estimatedPrice": "מחיר משוער בשקלים"}],
  "warnings": ["אזהרה 1 אם יש"],
  "whenToCallPro": "מתי כדאי להזמין בעל מקצוע",
  "israeliTip": "טיפ ספציפי לישראל (חנויות, מוצרים מקומיים וכו')"
}

כללים חשובים:
- videoSearchQuery צריך להתחיל ב"איך ל..." או "איך להחליף..." או "איך לתקן..."
- videoSearchQuery צריך להיות ספציפי ביותר לחלק המדויק שצריך לתקן/להחליף
- תמיד ציין את הסוג המדויק של הפריט (לדוגמה: "ברז במטבח", "ברז במקלחת" - לא סתם "ברז")
- אם הבעיה היא טפטוף ברז - כנראה צריך להחליף מחסנית. אם אסלה דולפת - כנראה צריך להחליף פלאפר
- steps צריך להיות מערך של מחרוזות פשוטות (לא אובייקטים)
- אם אתה לא בטוח מה הבעיה, שאל שאלה מבהירה בשדה problem
- תמיד התחשב בבטיחות - חשמל ומים דורשים זהירות
- מחירים בשקלים, חנויות ישראליות (הום סנטר, איקאה, ACE)
- אם הבעיה מסוכנת או מורכבת מדי - המלץ על איש מקצוע
- השב בעברית בלבד והחזר JSON תקין בלבד, ללא טקסט נוסף

שלטים רחוקים - כללים מיוחדים:
- אם הבעיה היא בתכונה ספציפית בשלט (I-feel, טיימר, טורבו):
  → חפש הסבר על איך להפעיל/להשתמש בתכונה, לא "תיקון"
  → דוגמה: "איך להשתמש בתכונת I-feel במזגן" (לא "איך לתקן I-feel")
- אם השלט בכלל לא עובד:
  → "איך להחליף סוללות בשלט מזגן" או "איך לאפס שלט מזגן"

חשוב מאוד: תמיד ציין את המיקום/סוג המדויק של הפריט בשאלה!"#;

static DATA_URL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:image/(\w+);base64,").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Material {
    #[serde(default)]
    pub item: String,
    #[serde(rename = "estimatedPrice", default)]
    pub estimated_price: Option<String>,
}

/// The structured diagnosis rendered to the user. Field names follow the
/// result view's wire format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Diagnosis {
    #[serde(default)]
    pub problem: String,
    #[serde(rename = "canDIY", default)]
    pub can_diy: bool,
    #[serde(rename = "difficultyScore", default)]
    pub difficulty_score: u8,
    #[serde(rename = "difficultyText", default)]
    pub difficulty_text: String,
    #[serde(rename = "timeEstimate", default)]
    pub time_estimate: Option<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(rename = "whenToCallPro", default)]
    pub when_to_call_pro: Option<String>,
    #[serde(rename = "israeliTip", default)]
    pub israeli_tip: Option<String>,
    /// Consumed by the pipeline, replaced by tutorialVideo in the response.
    #[serde(
        rename = "videoSearchQuery",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub video_search_query: Option<String>,
    #[serde(
        rename = "tutorialVideo",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub tutorial_video: Option<TutorialVideo>,
}

/// Image payload ready for the vision model: bare base64 plus a media type.
pub struct ImagePayload {
    pub data: String,
    pub media_type: String,
}

/// Strip a browser data-URL prefix if present and derive the media type from
/// it (camera captures arrive as `data:image/jpeg;base64,...`).
pub fn prepare_image(image: &str) -> ImagePayload {
    match DATA_URL_PREFIX.captures(image) {
        Some(caps) => ImagePayload {
            data: image[caps.get(0).unwrap().end()..].to_string(),
            media_type: format!("image/{}", &caps[1]),
        },
        None => ImagePayload {
            data: image.to_string(),
            media_type: "image/jpeg".to_string(),
        },
    }
}

fn build_prompt(description: Option<&str>) -> String {
    match description {
        Some(description) => format!(
            r#"המשתמש תיאר את הבעיה בקול: "{description}"

זכור:
- אם המשתמש ציין תכונה ספציפית (אייפיל/I-feel, טיימר, טורבו) - זו הבעיה, תכלול אותה ב-problem וב-videoSearchQuery
- "אייפיל" = I-feel (תכונה במזגן)
- אם לא הבנת מהתמונה - שאל שאלה מבהירה

{DIAGNOSIS_PROMPT}"#
        ),
        None => DIAGNOSIS_PROMPT.to_string(),
    }
}

/// Ask the vision model for a structured diagnosis of the photographed
/// problem, optionally grounded by the cleaned spoken description.
pub async fn diagnose_image(
    client: &reqwest::Client,
    image: &ImagePayload,
    description: Option<&str>,
    api_key: &str,
) -> Result<Diagnosis> {
    let body = serde_json::json!({
        "model": anthropic::MODEL,
        "max_tokens": 2000,
        "messages": [{
            "role": "user",
            "content": [
                {
                    "type": "image",
                    "source": {
                        "type": "base64",
                        "media_type": image.media_type,
                        "data": image.data,
                    },
                },
                {
                    "type": "text",
                    "text": build_prompt(description),
                },
            ],
        }],
    });

    let reply = anthropic::complete_text(client, api_key, &body)
        .await
        .context("Vision diagnosis request failed")?;

    Ok(parse_diagnosis(&reply))
}

/// Parse the model reply, degrading to a minimal diagnosis that carries the
/// raw text when the reply is not valid JSON.
fn parse_diagnosis(reply: &str) -> Diagnosis {
    let cleaned = strip_code_fences(reply);
    match serde_json::from_str::<Diagnosis>(cleaned) {
        Ok(diagnosis) => diagnosis,
        Err(e) => {
            eprintln!("Diagnosis reply was not valid JSON ({e}), returning raw text");
            Diagnosis {
                problem: reply.trim().to_string(),
                can_diy: false,
                difficulty_score: 5,
                difficulty_text: "לא ניתן לקבוע".to_string(),
                warnings: vec!["לא הצלחתי לנתח את התמונה כראוי".to_string()],
                ..Diagnosis::default()
            }
        }
    }
}

/// Models occasionally wrap JSON in ```json fences despite the instructions.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_start_matches('\n')
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}
