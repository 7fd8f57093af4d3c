// crates/bf_physics/src/builder.rs

//! 计算域构建
//!
//! 提供从配置值到 [`Domain`] 的桥梁：
//!
//! ```text
//! SimulationConfig ──> DomainBuilder ──> Domain
//!     │                    │
//!     │                    ├─ Topology        (块尺寸 + 逐面单侧连接)
//!     │                    ├─ BoundaryCondition × 6 / 块 (缺省 slip_wall)
//!     │                    ├─ StructuredGrid  (全部块给出几何盒时)
//!     │                    └─ ExplicitRankMap (配置给出时)
//! ```
//!
//! 相邻面按配置逐面单侧装配，不在构建时检查回连，
//! 由 [`Domain::check_connectivity`] 报告全部不一致。

use std::collections::HashMap;
use std::sync::Arc;

use bf_config::{
    BcKey, BlockConfig, ConfigError, FaceConfig, FlowConditionConfig, SimulationConfig,
};
use bf_foundation::Face;
use bf_mesh::{
    ExplicitRankMap, FaceLink, MeshError, Neighbor, Orientation, StructuredGrid, Topology,
};
use glam::DVec3;

use crate::boundary::{
    BoundaryCondition, BoundaryKind, CatalyticPolicy, EquilibriumTable, ExtrapolationOrder,
    TemperatureRamp, UserDefinedBoundary, WallCondition, WallThermal,
};
use crate::context::SimContext;
use crate::domain::{Block, Domain};
use crate::error::{PhysicsError, PhysicsResult};
use crate::state::{BlockFlow, FlowState};

/// 计算域构建器
///
/// # 示例
///
/// ```
/// use bf_config::SimulationConfig;
/// use bf_physics::DomainBuilder;
///
/// let cfg = SimulationConfig::from_json_str(r#"{
///     "blocks": [{ "nni": 4, "nnj": 4, "faces": { "south": { "bc": "fixed_t", "t_wall": 300.0 } } }]
/// }"#).unwrap();
/// let domain = DomainBuilder::new(&cfg).build().unwrap();
/// assert!(domain.check_connectivity().is_valid());
/// ```
pub struct DomainBuilder<'a> {
    config: &'a SimulationConfig,
    initial: Option<FlowState>,
    user: HashMap<(usize, Face), Arc<dyn UserDefinedBoundary>>,
}

impl<'a> DomainBuilder<'a> {
    /// 创建构建器
    pub fn new(config: &'a SimulationConfig) -> Self {
        Self {
            config,
            initial: None,
            user: HashMap::new(),
        }
    }

    /// 设置全部单元的初始状态
    pub fn with_initial_state(mut self, state: FlowState) -> Self {
        self.initial = Some(state);
        self
    }

    /// 为 `user_defined` 面注册处理器
    pub fn with_user_defined(
        mut self,
        block: usize,
        face: Face,
        handler: Arc<dyn UserDefinedBoundary>,
    ) -> Self {
        self.user.insert((block, face), handler);
        self
    }

    /// 构建计算域
    pub fn build(self) -> PhysicsResult<Domain> {
        let config = self.config;
        config.validate()?;
        let ctx = SimContext::from_config(config)?;

        let mut topology = Topology::new(ctx.dimension, ctx.nghost);
        for (id, bc) in config.blocks.iter().enumerate() {
            let label = if bc.label.is_empty() {
                format!("block-{}", id)
            } else {
                bc.label.clone()
            };
            topology.add_block(label, bc.nni, bc.nnj, bc.nnk)?;
        }

        let initial = self
            .initial
            .clone()
            .unwrap_or_else(|| FlowState::new(ctx.n_modes, ctx.n_species));

        let mut blocks = Vec::with_capacity(config.blocks.len());
        for (id, block_cfg) in config.blocks.iter().enumerate() {
            let dims = *topology.dims(id)?;
            let mut bcs: [BoundaryCondition; 6] = Default::default();
            for &face in topology.faces() {
                let face_cfg = block_cfg.face_config(face);
                let bc = self.boundary_for(&ctx, id, face, face_cfg, dims.face_len(face))?;
                if matches!(bc, BoundaryCondition::Adjacent) {
                    let link = adjacent_link(id, face, face_cfg)?;
                    topology.set_link(id, face, link)?;
                }
                bcs[face.index()] = bc;
            }
            blocks.push(Block {
                id,
                label: topology.block(id)?.label.clone(),
                bcs,
                flow: BlockFlow::new(dims, &initial),
            });
        }

        let grid = if config.has_geometry() {
            Some(cartesian_grid(&topology, &config.blocks)?)
        } else {
            None
        };

        let rank_map = config.rank_map.as_ref().map(|m| {
            ExplicitRankMap::from_pairs(m.entries.iter().map(|e| (e.rank, e.blocks.clone())))
        });

        let mut domain = Domain::new(ctx, topology, blocks, grid, rank_map)?;
        domain.compute_wall_distances()?;

        tracing::info!(
            "domain built: {} blocks, {}, viscous={}, turbulence={:?}, geometry={}",
            domain.n_blocks(),
            ctx.dimension,
            ctx.viscous,
            ctx.turbulence,
            domain.grid().is_some()
        );
        Ok(domain)
    }

    fn boundary_for(
        &self,
        ctx: &SimContext,
        block: usize,
        face: Face,
        cfg: Option<&FaceConfig>,
        face_len: usize,
    ) -> PhysicsResult<BoundaryCondition> {
        let Some(cfg) = cfg else {
            return Ok(BoundaryCondition::SlipWall);
        };
        let kind = resolve_kind(block, face, &cfg.bc)?;
        let key = |field: &str| format!("blocks[{}].faces.{}.{}", block, face, field);
        let require = |value: Option<f64>, field: &str| {
            value.ok_or_else(|| PhysicsError::from(ConfigError::missing(key(field))))
        };

        let bc = match kind {
            BoundaryKind::Adjacent => BoundaryCondition::Adjacent,
            BoundaryKind::SlipWall => BoundaryCondition::SlipWall,
            BoundaryKind::SupersonicIn => {
                let inflow = cfg
                    .inflow
                    .as_ref()
                    .ok_or_else(|| PhysicsError::from(ConfigError::missing(key("inflow"))))?;
                BoundaryCondition::SupersonicInflow {
                    inflow: flow_state_from(ctx, inflow)?,
                }
            }
            BoundaryKind::ExtrapolateOut => BoundaryCondition::ExtrapolateOut {
                order: ExtrapolationOrder::from_code(cfg.x_order.unwrap_or(0)),
            },
            BoundaryKind::FixedPOut => BoundaryCondition::FixedPressureOut {
                p_out: require(cfg.p_out, "p_out")?,
            },
            BoundaryKind::UserDefined => {
                let handler = self.user.get(&(block, face)).ok_or_else(|| {
                    PhysicsError::not_implemented(format!(
                        "块 {} 面 {} 的 user_defined 边界没有注册处理器",
                        block, face
                    ))
                })?;
                BoundaryCondition::UserDefined(Arc::clone(handler))
            }
            BoundaryKind::Adiabatic => wall(ctx, cfg, WallThermal::Adiabatic)?,
            BoundaryKind::FixedT => wall(
                ctx,
                cfg,
                WallThermal::Fixed {
                    t_wall: require(cfg.t_wall, "t_wall")?,
                },
            )?,
            BoundaryKind::SlidingT => {
                let ramp = TemperatureRamp {
                    t_wall_i: require(cfg.t_wall_i, "t_wall_i")?,
                    t_wall_f: require(cfg.t_wall_f, "t_wall_f")?,
                    t_i: require(cfg.t_i, "t_i")?,
                    t_f: require(cfg.t_f, "t_f")?,
                };
                if ramp.t_f <= ramp.t_i {
                    return Err(ConfigError::invalid_value(key("t_f"), ramp.t_f, "必须大于 t_i").into());
                }
                wall(ctx, cfg, WallThermal::Sliding(ramp))?
            }
            BoundaryKind::JumpWall => wall(
                ctx,
                cfg,
                WallThermal::Jump {
                    t_wall: require(cfg.t_wall, "t_wall")?,
                    sigma: cfg.sigma.unwrap_or(0.0),
                },
            )?,
            BoundaryKind::ConjugateHt => {
                let temperatures = match cfg.t_wall {
                    Some(t) => vec![t; face_len],
                    None => Vec::new(),
                };
                wall(ctx, cfg, WallThermal::Coupled { temperatures })?
            }
        };
        tracing::debug!("block {} {}: {}", block, face, bc.kind());
        Ok(bc)
    }
}

/// 解析类型键
fn resolve_kind(block: usize, face: Face, key: &BcKey) -> PhysicsResult<BoundaryKind> {
    match key {
        BcKey::Code(code) => match BoundaryKind::from_code(*code) {
            Some(kind) => Ok(kind),
            None => match BoundaryKind::unmodelled_name(*code) {
                Some(name) => Err(PhysicsError::not_implemented(format!(
                    "边界条件类型 '{}' (代码 {}, 块 {} 面 {})",
                    name, code, block, face
                ))),
                None => Err(PhysicsError::unknown_boundary(block, face, code.to_string())),
            },
        },
        BcKey::Name(name) => match BoundaryKind::from_key(name) {
            Some(kind) => Ok(kind),
            None if BoundaryKind::is_unmodelled(name) => Err(PhysicsError::not_implemented(
                format!("边界条件类型 '{}' (块 {} 面 {})", name, block, face),
            )),
            None => Err(PhysicsError::unknown_boundary(block, face, name.clone())),
        },
    }
}

/// 无滑移壁面：热行为 + 催化策略 + 发射率
fn wall(ctx: &SimContext, cfg: &FaceConfig, thermal: WallThermal) -> PhysicsResult<BoundaryCondition> {
    let table = match &cfg.wcbc_table {
        Some(t) => Some(EquilibriumTable::new(t.lp_min, t.dlp, t.massf.clone())?),
        None => None,
    };
    let catalytic = match &cfg.wc_bc {
        Some(key) => CatalyticPolicy::from_key(key, cfg.mass_f.as_deref(), table, ctx.n_species)?,
        None => CatalyticPolicy::NonCatalytic,
    };
    let mut wall = WallCondition::new(thermal).with_catalytic(catalytic);
    if let Some(e) = cfg.emissivity {
        wall.emissivity = e;
    }
    Ok(BoundaryCondition::Wall(wall))
}

/// 相邻面的单侧连接
fn adjacent_link(block: usize, face: Face, cfg: Option<&FaceConfig>) -> PhysicsResult<FaceLink> {
    const OP: &str = "build";
    let cfg = cfg.ok_or_else(|| {
        MeshError::invalid_topology(OP, format!("块 {} 面 {} 缺少相邻信息", block, face))
    })?;
    let other = cfg.other_block.ok_or_else(|| {
        MeshError::invalid_topology(OP, format!("块 {} 面 {} 缺少 other_block", block, face))
    })?;
    let other = usize::try_from(other).map_err(|_| {
        MeshError::invalid_topology(OP, format!("块 {} 面 {}: 邻块编号 {} 为负", block, face, other))
    })?;
    let other_face = cfg
        .other_face
        .as_deref()
        .and_then(Face::from_name)
        .ok_or_else(|| {
            MeshError::invalid_topology(OP, format!("块 {} 面 {} 缺少有效的 other_face", block, face))
        })?;
    // 同名面相连（如 EAST↔EAST）时方向不取默认值
    if cfg.orientation.is_none() && other_face == face {
        return Err(MeshError::invalid_topology(
            OP,
            format!(
                "块 {} 面 {} 连接到块 {} 的同名面，必须显式给出 orientation",
                block, face, other
            ),
        )
        .into());
    }
    let code = cfg.orientation.unwrap_or(0);
    let orientation = Orientation::from_code(code).ok_or_else(|| {
        MeshError::invalid_topology(OP, format!("块 {} 面 {}: 方向代码 {} 无效", block, face, code))
    })?;
    Ok(FaceLink::Adjacent(Neighbor {
        block: other,
        face: other_face,
        orientation,
    }))
}

/// 入流条件 → 流动状态
fn flow_state_from(ctx: &SimContext, cfg: &FlowConditionConfig) -> PhysicsResult<FlowState> {
    let mut fs = FlowState::new(ctx.n_modes, ctx.n_species);
    fs.gas.rho = cfg.rho;
    fs.gas.p = cfg.p;
    fs.gas.set_temperature(cfg.t);
    fs.gas.mu = cfg.mu;
    if !cfg.massf.is_empty() {
        if cfg.massf.len() != ctx.n_species {
            return Err(PhysicsError::invalid_state(format!(
                "入流组分长度 {} 与组分数 {} 不符",
                cfg.massf.len(),
                ctx.n_species
            )));
        }
        fs.gas.massf = cfg.massf.clone();
    }
    fs.vel = DVec3::from_array(cfg.vel);
    fs.tke = cfg.tke;
    fs.omega = cfg.omega;
    if !fs.gas.is_valid() {
        return Err(PhysicsError::invalid_state(format!(
            "入流状态无效: rho={}, p={}, T={}",
            cfg.rho, cfg.p, cfg.t
        )));
    }
    Ok(fs)
}

/// 由块几何盒生成笛卡尔网格
fn cartesian_grid(topology: &Topology, blocks: &[BlockConfig]) -> PhysicsResult<StructuredGrid> {
    let boxes: Vec<(DVec3, DVec3)> = blocks
        .iter()
        .filter_map(|b| b.geometry.as_ref())
        .map(|g| (DVec3::from_array(g.origin), DVec3::from_array(g.size)))
        .collect();
    Ok(StructuredGrid::cartesian(topology, &boxes)?)
}
