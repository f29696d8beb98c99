//! Perceive for many GTUs against one world snapshot.

use lp_core::{GtuId, PerceptionResult};
use lp_headway::HeadwayGtuType;
use lp_network::PerceptionWorld;

use crate::DirectNeighborsPerception;

/// A GTU that perceives, with the headway type it owns across ticks.
pub struct PerceivingAgent {
    pub gtu:          GtuId,
    pub headway_type: HeadwayGtuType,
}

impl PerceivingAgent {
    pub fn new(gtu: GtuId, headway_type: HeadwayGtuType) -> Self {
        Self { gtu, headway_type }
    }
}

/// Build, fully update and consume the perception of every agent.
///
/// `consume` turns each updated perception into an owned result (typically
/// the inputs of a car-following model).  Results come back in `agents`
/// order.  With the `parallel` feature the agents are processed on Rayon's
/// thread pool; each perception stays on the thread that built it.
pub fn update_all_agents<R, F>(
    world: &PerceptionWorld<'_>,
    agents: &mut [PerceivingAgent],
    consume: F,
) -> Vec<PerceptionResult<R>>
where
    R: Send,
    F: Fn(&DirectNeighborsPerception<'_>) -> PerceptionResult<R> + Sync,
{
    let perceive = |agent: &mut PerceivingAgent| -> PerceptionResult<R> {
        let mut perception = DirectNeighborsPerception::new(world, agent.gtu, &agent.headway_type)?;
        perception.update_all()?;
        consume(&perception)
    };

    #[cfg(not(feature = "parallel"))]
    {
        agents.iter_mut().map(perceive).collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        agents.par_iter_mut().map(perceive).collect()
    }
}
