use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::skill::{Intent, IntentRequest, SkillResponse};
use crate::speech::wrap_speak;

pub const NEWS_DATE_SLOT: &str = "newsDate";

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
  #[serde(default)]
  pub version: Option<String>,
  #[serde(default)]
  pub session: Option<Session>,
  #[serde(default)]
  pub context: Option<Context>,
  pub request: Request,
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Session {
  #[serde(default)]
  pub application: Option<Application>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct Context {
  #[serde(rename = "System", default)]
  pub system: Option<System>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct System {
  #[serde(default)]
  pub application: Option<Application>,
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Application {
  pub application_id: String,
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Request {
  #[serde(rename = "type")]
  pub request_type: String,
  #[serde(default)]
  pub request_id: Option<String>,
  #[serde(default)]
  pub intent: Option<IntentPayload>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct IntentPayload {
  pub name: String,
  #[serde(default)]
  pub slots: HashMap<String, Slot>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct Slot {
  #[serde(default)]
  pub value: Option<String>,
}

impl RequestEnvelope {
  /// The skill this request is addressed to. The context copy is present on
  /// every request, the session copy only on in-session ones.
  pub fn application_id(&self) -> Option<&str> {
    let from_context = self
      .context
      .as_ref()
      .and_then(|c| c.system.as_ref())
      .and_then(|s| s.application.as_ref());
    let from_session =
      self.session.as_ref().and_then(|s| s.application.as_ref());

    from_context
      .or(from_session)
      .map(|app| app.application_id.as_str())
  }

  pub fn request_id(&self) -> Option<&str> {
    self.request.request_id.as_deref()
  }

  pub fn into_intent_request(self) -> IntentRequest {
    let Request {
      request_type,
      request_id,
      intent,
    } = self.request;

    let intent = match (request_type.as_str(), intent) {
      ("IntentRequest", Some(mut payload)) => {
        let news_date =
          payload.slots.remove(NEWS_DATE_SLOT).and_then(|slot| slot.value);
        Intent::from_name(&payload.name, news_date)
      }
      ("LaunchRequest" | "SessionEndedRequest", _) => {
        Intent::from_name(&request_type, None)
      }
      (other, _) => Intent::Unknown(other.to_string()),
    };

    IntentRequest { intent, request_id }
  }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ResponseEnvelope {
  pub version: &'static str,
  pub response: ResponseBody,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
  pub output_speech: OutputSpeech,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reprompt: Option<Reprompt>,
  pub should_end_session: bool,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
  pub output_speech: OutputSpeech,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum OutputSpeech {
  Ssml { ssml: String },
}

impl OutputSpeech {
  pub fn ssml(text: &str) -> Self {
    OutputSpeech::Ssml {
      ssml: wrap_speak(text),
    }
  }
}

impl From<SkillResponse> for ResponseEnvelope {
  fn from(resp: SkillResponse) -> Self {
    let should_end_session = resp.should_end_session();
    let reprompt = resp.reprompt.as_deref().map(|text| Reprompt {
      output_speech: OutputSpeech::ssml(text),
    });

    Self {
      version: "1.0",
      response: ResponseBody {
        output_speech: OutputSpeech::ssml(&resp.speech),
        reprompt,
        should_end_session,
      },
    }
  }
}

#[cfg(test)]
pub(crate) mod test {
  use serde_json::json;

  use super::*;

  pub(crate) const SKILL_ID: &str = "amzn1.ask.skill.test-skill";

  pub(crate) fn intent_request_json(
    name: &str,
    slots: serde_json::Value,
  ) -> serde_json::Value {
    json!({
      "version": "1.0",
      "session": {
        "new": false,
        "sessionId": "amzn1.echo-api.session.1",
        "application": { "applicationId": SKILL_ID }
      },
      "context": {
        "System": {
          "application": { "applicationId": SKILL_ID },
          "device": { "deviceId": "device-1" }
        }
      },
      "request": {
        "type": "IntentRequest",
        "requestId": "amzn1.echo-api.request.1",
        "timestamp": "2024-01-10T12:00:00Z",
        "locale": "en-US",
        "intent": { "name": name, "confirmationStatus": "NONE", "slots": slots }
      }
    })
  }

  fn parse(value: serde_json::Value) -> RequestEnvelope {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn test_launch_request() {
    let envelope = parse(json!({
      "version": "1.0",
      "context": { "System": { "application": { "applicationId": SKILL_ID } } },
      "request": { "type": "LaunchRequest", "requestId": "r1" }
    }));

    assert_eq!(envelope.application_id(), Some(SKILL_ID));
    assert_eq!(envelope.request_id(), Some("r1"));
    assert_eq!(envelope.into_intent_request().intent, Intent::Launch);
  }

  #[test]
  fn test_news_date_slot() {
    let envelope = parse(intent_request_json(
      "ReadItemsFromDate",
      json!({ "newsDate": { "name": "newsDate", "value": "2024-01-10" } }),
    ));

    assert_eq!(
      envelope.into_intent_request().intent,
      Intent::ReadItemsFromDate {
        news_date: Some("2024-01-10".into())
      }
    );
  }

  #[test]
  fn test_unfilled_slot() {
    let envelope = parse(intent_request_json(
      "ReadItemsFromADate",
      json!({ "newsDate": { "name": "newsDate" } }),
    ));

    assert_eq!(
      envelope.into_intent_request().intent,
      Intent::ReadItemsFromDate { news_date: None }
    );
  }

  #[test]
  fn test_builtin_intents() {
    for (name, intent) in [
      ("AMAZON.HelpIntent", Intent::Help),
      ("AMAZON.CancelIntent", Intent::Cancel),
      ("AMAZON.StopIntent", Intent::Stop),
      ("ReadTopFive", Intent::ReadTopFive),
      (
        "AMAZON.FallbackIntent",
        Intent::Unknown("AMAZON.FallbackIntent".into()),
      ),
    ] {
      let envelope = parse(intent_request_json(name, json!({})));
      assert_eq!(envelope.into_intent_request().intent, intent);
    }
  }

  #[test]
  fn test_unknown_request_type() {
    let envelope = parse(json!({
      "request": { "type": "CanFulfillIntentRequest" }
    }));
    assert_eq!(envelope.application_id(), None);
    assert_eq!(
      envelope.into_intent_request().intent,
      Intent::Unknown("CanFulfillIntentRequest".into())
    );
  }

  #[test]
  fn test_session_application_fallback() {
    let envelope = parse(json!({
      "session": { "application": { "applicationId": "from-session" } },
      "request": { "type": "SessionEndedRequest", "reason": "USER_INITIATED" }
    }));
    assert_eq!(envelope.application_id(), Some("from-session"));
    assert_eq!(envelope.into_intent_request().intent, Intent::SessionEnded);
  }

  #[test]
  fn test_response_envelope() {
    let resp = SkillResponse::with_reprompt("Hello, welcome.".into());
    let value = serde_json::to_value(ResponseEnvelope::from(resp)).unwrap();

    assert_eq!(
      value,
      json!({
        "version": "1.0",
        "response": {
          "outputSpeech": {
            "type": "SSML",
            "ssml": "<speak>Hello, welcome.</speak>"
          },
          "reprompt": {
            "outputSpeech": {
              "type": "SSML",
              "ssml": "<speak>Hello, welcome.</speak>"
            }
          },
          "shouldEndSession": false
        }
      })
    );
  }

  #[test]
  fn test_response_envelope_ends_session() {
    let resp = SkillResponse::ending("Goodbye!".into());
    let value = serde_json::to_value(ResponseEnvelope::from(resp)).unwrap();

    assert_eq!(value["response"]["shouldEndSession"], json!(true));
    assert!(value["response"].get("reprompt").is_none());
  }
}
