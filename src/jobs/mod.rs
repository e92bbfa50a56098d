// src/jobs/mod.rs
//! Job ingestion: fetch the scraped dataset, structure it, embed it

pub mod extractor;
pub mod fetcher;
pub mod outputs;
pub mod pipeline;
pub mod preprocess;
pub mod record;
pub mod vectorizer;

pub use extractor::{parse_extracted_details, DetailsExtractor};
pub use fetcher::{extract_listings, DatasetFetcher, ExtractionReport, SeekListing};
pub use outputs::{save_outputs, SavedOutputs};
pub use pipeline::{
    JobPipeline, PipelineFlags, PipelineStatus, PipelineStep, StepBlocked, StepReport,
};
pub use preprocess::preprocess;
pub use record::{ExtractedJobDetails, JobRecord, StoredJob};
pub use vectorizer::{JobSearch, JobVectorizer, SearchHit, VectorizeReport};
