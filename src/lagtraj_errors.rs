use thiserror::Error;

#[derive(Error, Debug)]
pub enum LagtrajError {
    // --- Configuration ---
    #[error("`{0}` trajectory type not available (expected one of: eulerian, linear, integrated)")]
    UnknownTrajectoryKind(String),

    #[error("Missing parameter for `{kind}` trajectory: {message}")]
    MissingParameter { kind: String, message: String },

    #[error("Invalid timestep: {0}")]
    InvalidTimestep(String),

    #[error("Invalid trajectory window: {0}")]
    InvalidWindow(String),

    #[error("Invalid velocity method: {0}")]
    InvalidVelocityMethod(String),

    #[error("Invalid trajectory definition: {0}")]
    InvalidDefinition(String),

    // --- Data availability ---
    #[error("Some of the data for the selected domain ({0}) hasn't been downloaded yet")]
    DomainDataIncomplete(String),

    #[error(
        "You selected to use the domain data for timesteps in the trajectory, but in the time \
         interval selected for the trajectory ({requested}) there is no domain data \
         (time range: {available})"
    )]
    NoDomainDataInWindow { requested: String, available: String },

    #[error(
        "The time interval selected for the trajectory ({requested}) is not fully covered \
         by the domain data (time range: {available})"
    )]
    WindowNotCovered { requested: String, available: String },

    // --- Sampling ---
    #[error("Velocity sampling failed: {0}")]
    VelocitySampling(String),

    #[error("Point outside of the domain: {0}")]
    OutOfDomain(String),

    // --- Hydrostatic coefficients ---
    #[error("Error during the nom parsing: {0}")]
    NomParsingError(String),

    #[error("Invalid level coefficients: {0}")]
    InvalidLevelCoefficients(String),

    // --- I/O and parsing ---
    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Unable to parse timestamp: {0}")]
    TimeParsingError(String),
}

impl LagtrajError {
    /// Fatal errors detected before any stepping happens.
    pub fn is_configuration_error(&self) -> bool {
        use LagtrajError::*;
        matches!(
            self,
            UnknownTrajectoryKind(_)
                | MissingParameter { .. }
                | InvalidTimestep(_)
                | InvalidWindow(_)
                | InvalidVelocityMethod(_)
                | InvalidDefinition(_)
        )
    }

    /// Requested window or domain data not available.
    pub fn is_data_availability_error(&self) -> bool {
        use LagtrajError::*;
        matches!(
            self,
            DomainDataIncomplete(_) | NoDomainDataInWindow { .. } | WindowNotCovered { .. }
        )
    }
}

impl PartialEq for LagtrajError {
    fn eq(&self, other: &Self) -> bool {
        use LagtrajError::*;
        match (self, other) {
            (UnknownTrajectoryKind(a), UnknownTrajectoryKind(b)) => a == b,
            (
                MissingParameter {
                    kind: ka,
                    message: ma,
                },
                MissingParameter {
                    kind: kb,
                    message: mb,
                },
            ) => ka == kb && ma == mb,
            (InvalidTimestep(a), InvalidTimestep(b)) => a == b,
            (InvalidWindow(a), InvalidWindow(b)) => a == b,
            (InvalidVelocityMethod(a), InvalidVelocityMethod(b)) => a == b,
            (InvalidDefinition(a), InvalidDefinition(b)) => a == b,
            (DomainDataIncomplete(a), DomainDataIncomplete(b)) => a == b,
            (
                NoDomainDataInWindow {
                    requested: ra,
                    available: aa,
                },
                NoDomainDataInWindow {
                    requested: rb,
                    available: ab,
                },
            ) => ra == rb && aa == ab,
            (
                WindowNotCovered {
                    requested: ra,
                    available: aa,
                },
                WindowNotCovered {
                    requested: rb,
                    available: ab,
                },
            ) => ra == rb && aa == ab,
            (VelocitySampling(a), VelocitySampling(b)) => a == b,
            (OutOfDomain(a), OutOfDomain(b)) => a == b,
            (NomParsingError(a), NomParsingError(b)) => a == b,
            (InvalidLevelCoefficients(a), InvalidLevelCoefficients(b)) => a == b,
            (TimeParsingError(a), TimeParsingError(b)) => a == b,

            // Foreign errors are not comparable: equal when the variant matches
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,
            (TomlError(_), TomlError(_)) => true,

            _ => false,
        }
    }
}
