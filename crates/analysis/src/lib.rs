pub mod keywords;
pub mod reconcile;
pub mod recommend;
pub mod report;
pub mod stopwords;
pub mod tfidf;

pub use keywords::{KeywordGap, keyword_gaps};
pub use reconcile::{ComparisonResult, EntityPartitions};
pub use recommend::synthesize;
pub use report::{CompetitorAnalysis, ReportBuilder, ReportOptions, SeoReport};
pub use tfidf::{TermWeights, TfidfVectorizer};
