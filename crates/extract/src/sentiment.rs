use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

impl Polarity {
    pub fn from_score(score: f64) -> Self {
        if score > 0.0 {
            Polarity::Positive
        } else if score < 0.0 {
            Polarity::Negative
        } else {
            Polarity::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sentiment {
    pub score: f64,
    pub polarity: Polarity,
}

impl Sentiment {
    pub fn new(score: f64) -> Self {
        Self {
            score,
            polarity: Polarity::from_score(score),
        }
    }

    pub fn neutral() -> Self {
        Self::new(0.0)
    }
}
