pub mod config {
    pub mod host;
    pub mod settings;
}

pub mod core {
    pub mod interval;
    pub mod orchestrator;
    pub mod progress;
    pub mod scanner;
}

pub mod export {
    pub mod json;
    pub mod markdown;
}

pub mod models {
    pub mod metric;
    pub mod scan_result;
}

pub mod report {
    pub mod reporter;
    pub mod sink;
}
