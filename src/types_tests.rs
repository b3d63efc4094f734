//! Tests for API types

#[cfg(test)]
mod tests {
    use super::super::types::*;
    use crate::edge::{EdgeCalculation, RecommendedSide};
    use crate::odds::OddsValue;
    use serde_json::json;

    #[test]
    fn test_predict_request_parses_mixed_features() {
        let req: PredictRequest = serde_json::from_value(json!({
            "features": {"home_elo": 1620.5, "away_elo": "1580", "neutral_site": false}
        }))
        .unwrap();
        let features = req.features.unwrap();
        assert_eq!(features.len(), 3);
        assert_eq!(features["away_elo"], "1580");
    }

    #[test]
    fn test_predict_request_without_features() {
        let req: PredictRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.features.is_none());
    }

    #[test]
    fn test_edge_request_defaults() {
        let req: EdgeRequest = serde_json::from_value(json!({
            "model_probability": 0.6,
            "bookmaker_odds": -110
        }))
        .unwrap();
        assert_eq!(req.bookmaker_odds, OddsValue::Number(-110.0));
        assert!(req.odds_format.is_none());
        assert!(req.edge_threshold.is_none());
        assert!(req.bet_amount.is_none());
        assert!(req.kelly_fraction.is_none());
    }

    #[test]
    fn test_edge_request_fractional() {
        let req: EdgeRequest = serde_json::from_value(json!({
            "model_probability": 0.4,
            "bookmaker_odds": "5/2",
            "odds_format": "fractional",
            "edge_threshold": 0.03,
            "bet_amount": 25.0
        }))
        .unwrap();
        assert_eq!(req.bookmaker_odds, OddsValue::Text("5/2".to_string()));
        assert_eq!(req.odds_format.as_deref(), Some("fractional"));
        assert_eq!(req.bet_amount, Some(25.0));
    }

    #[test]
    fn test_edge_response_flattens_calculation() {
        let resp = EdgeResponse {
            calculation: EdgeCalculation {
                model_probability: 0.6,
                implied_probability: 0.5238,
                edge: 0.0762,
                expected_value: 14.5455,
                recommended_side: RecommendedSide::Bet,
                confidence: 0.1524,
            },
            kelly_stake: None,
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["edge"], 0.0762);
        assert_eq!(value["recommended_side"], "bet");
        assert!(value.get("kelly_stake").is_none());
        assert!(value.get("calculation").is_none());
    }

    #[test]
    fn test_model_not_found_message() {
        let resp = ModelNotFoundResponse::new("v99", vec!["v1".to_string()]);
        assert_eq!(resp.error, "Model v99 not found");
        assert_eq!(resp.available_models, vec!["v1"]);
    }
}
