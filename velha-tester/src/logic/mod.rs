//! Scenario engine for exercising the velha core without a UI
pub mod game_tester;
pub mod reports;
pub mod scenarios;
pub mod seeds;
pub mod tester;

pub use game_tester::{GameTester, HumanStrategy, SimulationPlan, SimulationSummary};
pub use scenarios::{ScenarioPlan, TestScenario, get_scenario, list_scenarios};
pub use tester::{LogicTester, ScenarioResult};
