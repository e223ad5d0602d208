//! Launch description assembly
//!
//! Assembly is a straight line with two independent binary decisions: which
//! joint-state source to start and whether rviz gets an explicit layout. Both
//! are taken once, in [`Orchestrator::plan`], and stored as two-variant enums so
//! the assembled description always carries exactly one of each.

use crate::actions::ArgumentDeclaration;
use crate::ament::{probe, Availability, FileProbe, PackageLookup};
use crate::config::LaunchConfig;
use crate::description::{
    compile_description, deferred_description, DescriptionCompiler, DescriptionMode,
};
use crate::error::{LaunchError, Result};
use crate::joint_state::{publish_command, JointStateMessage};
use crate::params::{ParameterSet, ParameterValue};
use crate::record::{LaunchDescription, LaunchEntity, LogRecord, NodeRecord, ProcessRecord};
use std::path::PathBuf;
use std::sync::Arc;

pub const USE_SIM_TIME: &str = "use_sim_time";
pub const ROBOT_DESCRIPTION: &str = "robot_description";
pub const STATE_PUBLISHER: &str = "robot_state_publisher";
pub const RVIZ: &str = "rviz2";
pub const STATIC_JOINT_STATE_PUBLISHER: &str = "static_joint_state_publisher";
pub const STARTUP_DELAY: &str = "startup_delay";

/// Where joint states come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JointStateSource {
    /// Interactive slider GUI from the named package
    Gui { package: String },
    /// `ros2 topic pub` of a fixed all-zero state
    Static { command: Vec<String> },
}

/// How rviz is started
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visualization {
    /// Load the layout at this path with `-d`
    WithConfig(PathBuf),
    /// Let rviz use its own default view
    Default,
}

/// Outcome of every environment probe, before any entity is built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub share_directory: PathBuf,
    pub description_file: PathBuf,
    pub joint_state_source: JointStateSource,
    pub visualization: Visualization,
}

/// Builds the robot bringup launch description against an injected environment
pub struct Orchestrator<'a> {
    config: &'a LaunchConfig,
    packages: &'a dyn PackageLookup,
    files: &'a dyn FileProbe,
    compiler: &'a dyn DescriptionCompiler,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a LaunchConfig,
        packages: &'a dyn PackageLookup,
        files: &'a dyn FileProbe,
        compiler: &'a dyn DescriptionCompiler,
    ) -> Self {
        Self {
            config,
            packages,
            files,
            compiler,
        }
    }

    /// The launch argument this description declares
    pub fn sim_time_argument() -> ArgumentDeclaration {
        ArgumentDeclaration::boolean(USE_SIM_TIME, false, "Use simulation time if true")
    }

    /// Probe the environment and take both branch decisions.
    ///
    /// Fails if the robot package or its description file is missing. A
    /// missing GUI package selects the static publisher instead.
    pub fn plan(&self) -> Result<LaunchPlan> {
        let share_directory = self.packages.share_directory(&self.config.package)?;
        log::debug!(
            "Package {} share directory: {}",
            self.config.package,
            share_directory.display()
        );

        let description_file = share_directory.join(&self.config.description_file);
        if !self.files.exists(&description_file) {
            return Err(LaunchError::DescriptionNotFound(description_file));
        }

        log::info!("Checking for {} package...", self.config.gui_package);
        let joint_state_source = match probe(self.packages, &self.config.gui_package)? {
            Availability::Available(path) => {
                log::debug!(
                    "Package {} share directory: {}",
                    self.config.gui_package,
                    path.display()
                );
                JointStateSource::Gui {
                    package: self.config.gui_package.clone(),
                }
            }
            Availability::Unavailable => {
                log::info!(
                    "{} not installed, using static joint state publisher",
                    self.config.gui_package
                );
                JointStateSource::Static {
                    command: self.static_publisher_command()?,
                }
            }
        };

        let rviz_config = share_directory.join(&self.config.rviz_config);
        let visualization = if self.files.exists(&rviz_config) {
            Visualization::WithConfig(rviz_config)
        } else {
            log::info!(
                "Rviz config {} not found, using rviz defaults",
                rviz_config.display()
            );
            Visualization::Default
        };

        Ok(LaunchPlan {
            share_directory,
            description_file,
            joint_state_source,
            visualization,
        })
    }

    /// Assemble the launch description.
    ///
    /// Entity order: argument declaration, state publisher, joint-state
    /// source, rviz, log message, startup delay.
    pub fn assemble(&self) -> Result<LaunchDescription> {
        let plan = self.plan()?;
        let robot_description = self.robot_description(&plan)?;

        let sim_time = ParameterValue::launch_configuration(USE_SIM_TIME);
        let robot_params = Arc::new(
            ParameterSet::new()
                .with(ROBOT_DESCRIPTION, robot_description)
                .with(USE_SIM_TIME, sim_time.clone()),
        );
        let sim_time_params = Arc::new(ParameterSet::new().with(USE_SIM_TIME, sim_time));

        let state_publisher = NodeRecord::new(STATE_PUBLISHER, STATE_PUBLISHER)
            .output(self.config.output)
            .parameters(robot_params);

        let joint_state = match plan.joint_state_source {
            JointStateSource::Gui { package } => {
                let node = NodeRecord::new(package.as_str(), package.as_str());
                LaunchEntity::Node(node.output(self.config.output))
            }
            JointStateSource::Static { command } => LaunchEntity::ExecuteProcess(ProcessRecord {
                cmd: command,
                output: self.config.output,
                name: STATIC_JOINT_STATE_PUBLISHER.to_string(),
            }),
        };

        let mut rviz = NodeRecord::new(RVIZ, RVIZ)
            .output(self.config.output)
            .parameters(sim_time_params);
        if let Visualization::WithConfig(path) = &plan.visualization {
            rviz = rviz.arguments(["-d".to_string(), path.display().to_string()]);
        }

        let delay_secs = self.config.startup_delay_secs.to_string();
        let delay = ProcessRecord {
            cmd: vec!["sleep".to_string(), delay_secs],
            output: self.config.output,
            name: STARTUP_DELAY.to_string(),
        };

        Ok(LaunchDescription::new(vec![
            LaunchEntity::DeclareArgument(Self::sim_time_argument()),
            LaunchEntity::Node(state_publisher),
            joint_state,
            LaunchEntity::Node(rviz),
            LaunchEntity::LogInfo(LogRecord {
                msg: self.config.startup_message.clone(),
            }),
            LaunchEntity::ExecuteProcess(delay),
        ]))
    }

    fn robot_description(&self, plan: &LaunchPlan) -> Result<ParameterValue> {
        let description_file = &plan.description_file;
        match self.config.description_mode {
            DescriptionMode::Deferred => Ok(deferred_description(self.compiler, description_file)),
            DescriptionMode::Eager => {
                let compiled = compile_description(self.compiler, description_file)?;
                if matches!(plan.joint_state_source, JointStateSource::Static { .. })
                    && compiled.movable_joints != self.config.joint_states.joints
                {
                    log::warn!(
                        "Static joint states name {:?} but the model's movable joints are {:?}",
                        self.config.joint_states.joints,
                        compiled.movable_joints
                    );
                }
                Ok(ParameterValue::Text(compiled.urdf))
            }
        }
    }

    fn static_publisher_command(&self) -> Result<Vec<String>> {
        let fallback = &self.config.joint_states;
        let message = JointStateMessage::zeroed(&fallback.frame_id, &fallback.joints);
        Ok(publish_command(&fallback.topic, fallback.rate_hz, &message)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SubstitutionError;
    use crate::record::OutputMode;
    use crate::substitution::Substitution;
    use std::collections::HashSet;
    use std::path::Path;

    struct FakePackages(HashSet<&'static str>);

    impl PackageLookup for FakePackages {
        fn share_directory(&self, package: &str) -> Result<PathBuf> {
            if self.0.contains(package) {
                Ok(PathBuf::from("/opt/ros/test/share").join(package))
            } else {
                Err(LaunchError::PackageNotFound(package.to_string()))
            }
        }
    }

    struct FakeFiles(HashSet<PathBuf>);

    impl FileProbe for FakeFiles {
        fn exists(&self, path: &Path) -> bool {
            self.0.contains(path)
        }
    }

    struct FakeCompiler(std::result::Result<&'static str, &'static str>);

    impl DescriptionCompiler for FakeCompiler {
        fn command(&self, path: &Path) -> Vec<Substitution> {
            let command = format!("fake-xacro {}", path.display());
            vec![Substitution::Command(vec![Substitution::Text(command)])]
        }

        fn compile(&self, _path: &Path) -> Result<String> {
            self.0
                .map(str::to_string)
                .map_err(|e| SubstitutionError::CommandFailed(e.to_string()).into())
        }
    }

    const SHARE: &str = "/opt/ros/test/share/Articubot_CT";

    fn packages(gui: bool) -> FakePackages {
        let mut set = HashSet::from(["Articubot_CT"]);
        if gui {
            set.insert("joint_state_publisher_gui");
        }
        FakePackages(set)
    }

    fn files(rviz: bool) -> FakeFiles {
        let mut set = HashSet::from([Path::new(SHARE).join("description/robot.urdf.xacro")]);
        if rviz {
            set.insert(Path::new(SHARE).join("rviz/display.rviz"));
        }
        FakeFiles(set)
    }

    fn kinds(record: &LaunchDescription) -> Vec<&'static str> {
        record.entities.iter().map(LaunchEntity::kind).collect()
    }

    #[test]
    fn test_plan_gui_and_config() {
        let config = LaunchConfig::default();
        let (p, f, c) = (packages(true), files(true), FakeCompiler(Ok("<robot/>")));
        let plan = Orchestrator::new(&config, &p, &f, &c).plan().unwrap();

        assert_eq!(plan.share_directory, PathBuf::from(SHARE));
        assert_eq!(
            plan.joint_state_source,
            JointStateSource::Gui {
                package: "joint_state_publisher_gui".to_string()
            }
        );
        assert_eq!(
            plan.visualization,
            Visualization::WithConfig(Path::new(SHARE).join("rviz/display.rviz"))
        );
    }

    #[test]
    fn test_assemble_gui_and_config() {
        let config = LaunchConfig::default();
        let (p, f, c) = (packages(true), files(true), FakeCompiler(Ok("<robot/>")));
        let record = Orchestrator::new(&config, &p, &f, &c).assemble().unwrap();

        assert_eq!(
            kinds(&record),
            [
                "declare_argument",
                "node",
                "node",
                "node",
                "log_info",
                "execute_process",
            ]
        );
        let names: Vec<_> = record.nodes().map(|n| n.name.as_str()).collect();
        assert_eq!(names, [STATE_PUBLISHER, "joint_state_publisher_gui", RVIZ]);
        assert!(record.process(STATIC_JOINT_STATE_PUBLISHER).is_none());

        let rviz = record.node(RVIZ).unwrap();
        let layout = format!("{}/rviz/display.rviz", SHARE);
        assert_eq!(rviz.arguments, ["-d", layout.as_str()]);
        assert!(rviz.has_parameter(USE_SIM_TIME));
        assert!(!rviz.has_parameter(ROBOT_DESCRIPTION));
    }

    #[test]
    fn test_assemble_fallbacks() {
        let config = LaunchConfig::default();
        let (p, f, c) = (packages(false), files(false), FakeCompiler(Ok("<robot/>")));
        let record = Orchestrator::new(&config, &p, &f, &c).assemble().unwrap();

        assert_eq!(
            kinds(&record),
            [
                "declare_argument",
                "node",
                "execute_process",
                "node",
                "log_info",
                "execute_process",
            ]
        );
        assert!(record.node("joint_state_publisher_gui").is_none());

        let publisher = record.process(STATIC_JOINT_STATE_PUBLISHER).unwrap();
        assert_eq!(&publisher.cmd[3..6], ["-r", "10", "/joint_states"]);

        assert!(record.node(RVIZ).unwrap().arguments.is_empty());
    }

    #[test]
    fn test_state_publisher_shares_parameters() {
        let config = LaunchConfig::default();
        let (p, f, c) = (packages(true), files(true), FakeCompiler(Ok("<robot/>")));
        let record = Orchestrator::new(&config, &p, &f, &c).assemble().unwrap();

        let rsp: Vec<_> = record
            .nodes()
            .filter(|n| n.package == STATE_PUBLISHER)
            .collect();
        assert_eq!(rsp.len(), 1);

        let params = &rsp[0].parameters[0];
        let command = format!("fake-xacro {}/description/robot.urdf.xacro", SHARE);
        let expected = vec![Substitution::Command(vec![Substitution::Text(command)])];
        assert_eq!(
            params.get(ROBOT_DESCRIPTION),
            Some(&ParameterValue::deferred_string(expected))
        );
        assert_eq!(
            params.get(USE_SIM_TIME),
            Some(&ParameterValue::launch_configuration(USE_SIM_TIME))
        );
    }

    #[test]
    fn test_sim_time_default_is_false() {
        let decl = Orchestrator::sim_time_argument();
        assert_eq!(decl.name, "use_sim_time");
        assert_eq!(decl.default_value, "false");
    }

    #[test]
    fn test_missing_package_is_fatal() {
        let config = LaunchConfig::default();
        let (p, f) = (FakePackages(HashSet::new()), files(true));
        let c = FakeCompiler(Ok("<robot/>"));
        let orchestrator = Orchestrator::new(&config, &p, &f, &c);
        let err = orchestrator.assemble().unwrap_err();
        assert!(matches!(err, LaunchError::PackageNotFound(name) if name == "Articubot_CT"));
    }

    #[test]
    fn test_missing_description_is_fatal() {
        let config = LaunchConfig::default();
        let (p, f) = (packages(true), FakeFiles(HashSet::new()));
        let c = FakeCompiler(Ok("<robot/>"));
        let orchestrator = Orchestrator::new(&config, &p, &f, &c);
        let err = orchestrator.assemble().unwrap_err();
        assert!(matches!(err, LaunchError::DescriptionNotFound(_)));
    }

    #[test]
    fn test_deferred_mode_never_runs_compiler() {
        let config = LaunchConfig::default();
        let (p, f) = (packages(true), files(true));
        let c = FakeCompiler(Err("must not run"));
        assert!(Orchestrator::new(&config, &p, &f, &c).assemble().is_ok());
    }

    #[test]
    fn test_eager_mode_embeds_urdf() {
        let config = LaunchConfig {
            description_mode: DescriptionMode::Eager,
            ..LaunchConfig::default()
        };
        let (p, f) = (packages(false), files(false));
        let c = FakeCompiler(Ok("<robot name=\"r\"/>"));
        let record = Orchestrator::new(&config, &p, &f, &c).assemble().unwrap();

        let rsp = record.node(STATE_PUBLISHER).unwrap();
        assert_eq!(
            rsp.parameters[0].get(ROBOT_DESCRIPTION),
            Some(&ParameterValue::text("<robot name=\"r\"/>"))
        );
    }

    #[test]
    fn test_eager_mode_compiler_failure_is_fatal() {
        let config = LaunchConfig {
            description_mode: DescriptionMode::Eager,
            ..LaunchConfig::default()
        };
        let (p, f) = (packages(true), files(true));
        let c = FakeCompiler(Err("xacro: syntax error"));
        let orchestrator = Orchestrator::new(&config, &p, &f, &c);
        let err = orchestrator.assemble().unwrap_err();
        assert!(err.to_string().contains("xacro: syntax error"));
    }

    #[test]
    fn test_eager_mode_rejects_non_urdf() {
        let config = LaunchConfig {
            description_mode: DescriptionMode::Eager,
            ..LaunchConfig::default()
        };
        let (p, f, c) = (packages(true), files(true), FakeCompiler(Ok("not xml")));
        let orchestrator = Orchestrator::new(&config, &p, &f, &c);
        let err = orchestrator.assemble().unwrap_err();
        assert!(matches!(err, LaunchError::InvalidDescription { .. }));
    }

    #[test]
    fn test_custom_delay_and_output() {
        let config = LaunchConfig {
            startup_delay_secs: 5,
            output: OutputMode::Log,
            ..LaunchConfig::default()
        };
        let (p, f, c) = (packages(true), files(true), FakeCompiler(Ok("<robot/>")));
        let record = Orchestrator::new(&config, &p, &f, &c).assemble().unwrap();

        let delay = record.process(STARTUP_DELAY).unwrap();
        assert_eq!(delay.cmd, ["sleep", "5"]);
        assert!(record.nodes().all(|n| n.output == OutputMode::Log));
    }
}
