//! CMake adapter: configure, build and install the glslang source tree.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::builder::params::CMakeParams;
use crate::core::platform::BuildType;
use crate::util::fs::ensure_dir;
use crate::util::process::{find_cmake, ProcessBuilder};

/// CMake build adapter.
pub struct CMakeBuilder {
    cmake: PathBuf,
    source_dir: PathBuf,
    build_dir: PathBuf,
    install_prefix: PathBuf,
    build_type: BuildType,
    generator: Option<String>,
    jobs: Option<usize>,
}

impl CMakeBuilder {
    /// Create a new CMake builder.
    pub fn new(source_dir: PathBuf, build_dir: PathBuf, install_prefix: PathBuf) -> Result<Self> {
        let Some(cmake) = find_cmake() else {
            bail!(
                "CMake not found\n\
                 \n\
                 CMake is required to build glslang.\n\
                 Install CMake and ensure it's in your PATH."
            );
        };

        Ok(CMakeBuilder {
            cmake,
            source_dir,
            build_dir,
            install_prefix,
            build_type: BuildType::Release,
            generator: None,
            jobs: None,
        })
    }

    pub fn build_type(mut self, build_type: BuildType) -> Self {
        self.build_type = build_type;
        self
    }

    /// Use a specific CMake generator (e.g. "Ninja").
    pub fn generator(mut self, generator: Option<String>) -> Self {
        self.generator = generator;
        self
    }

    pub fn jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Arguments of the configure invocation.
    pub fn configure_args(&self, params: &CMakeParams) -> Vec<String> {
        let mut args = vec![
            "-S".to_string(),
            self.source_dir.display().to_string(),
            "-B".to_string(),
            self.build_dir.display().to_string(),
        ];

        if let Some(ref generator) = self.generator {
            args.push("-G".to_string());
            args.push(generator.clone());
        }

        args.push(format!("-DCMAKE_BUILD_TYPE={}", self.build_type));
        args.push(format!(
            "-DCMAKE_INSTALL_PREFIX={}",
            self.install_prefix.display()
        ));
        args.extend(params.to_args());
        args
    }

    /// Arguments of the build invocation.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "--build".to_string(),
            self.build_dir.display().to_string(),
            "--parallel".to_string(),
        ];
        if let Some(jobs) = self.jobs {
            args.push(jobs.to_string());
        }
        // Multi-config generators (Visual Studio, Xcode) pick the variant here.
        args.push("--config".to_string());
        args.push(self.build_type.to_string());
        args
    }

    /// Arguments of the install invocation.
    pub fn install_args(&self) -> Vec<String> {
        vec![
            "--install".to_string(),
            self.build_dir.display().to_string(),
            "--config".to_string(),
            self.build_type.to_string(),
            "--prefix".to_string(),
            self.install_prefix.display().to_string(),
        ]
    }

    /// Run CMake configuration.
    pub fn configure(&self, params: &CMakeParams) -> Result<()> {
        if !is_cmake_project(&self.source_dir) {
            bail!(
                "no CMakeLists.txt in {}; is the source revision correct?",
                self.source_dir.display()
            );
        }
        ensure_dir(&self.build_dir)?;

        tracing::info!("Configuring glslang ({})", self.build_type);
        ProcessBuilder::new(&self.cmake)
            .args(self.configure_args(params))
            .exec_and_check()?;
        Ok(())
    }

    /// Run CMake build.
    pub fn compile(&self) -> Result<()> {
        tracing::info!("Building glslang");
        ProcessBuilder::new(&self.cmake)
            .args(self.build_args())
            .exec_and_check()?;
        Ok(())
    }

    /// Install into the package prefix.
    pub fn install(&self) -> Result<()> {
        tracing::info!("Installing into {}", self.install_prefix.display());
        ensure_dir(&self.install_prefix)?;
        ProcessBuilder::new(&self.cmake)
            .args(self.install_args())
            .exec_and_check()?;
        Ok(())
    }
}

/// Check if a directory contains a CMake project.
pub fn is_cmake_project(dir: &Path) -> bool {
    dir.join("CMakeLists.txt").exists()
}
