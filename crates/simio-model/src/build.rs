//! Entity factories.
//!
//! Every factory validates the name, the ownership of each handle it is
//! given, and the kind-specific consistency rules, and only then inserts.
//! A returned error leaves the project untouched.

use simio_core::{EntityKind, IndexBox, TensorShape};

use crate::entity::*;
use crate::error::ModelError;
use crate::id::*;
use crate::project::{check_dimension, check_new_name, Project};

/// Dimensions covered by [`Project::create_standard_tensor_types`].
pub const STANDARD_DIMENSIONS: std::ops::RangeInclusive<usize> = 1..=3;

fn mismatch(detail: impl Into<String>) -> ModelError {
    ModelError::ReferenceMismatch {
        detail: detail.into(),
    }
}

impl Project {
    // ── Parameters and configurations ───────────────────────────

    /// Create a configuration.
    pub fn create_configuration(&mut self, name: &str) -> Result<ConfigurationId, ModelError> {
        check_new_name(&self.configuration_names, EntityKind::Configuration, name)?;
        let id = self.configurations.push(Configuration {
            name: name.to_string(),
            parameter_values: Vec::new(),
            members: Vec::new(),
        });
        self.configuration_names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Record `member` as created in `configuration`.
    fn add_member(
        &mut self,
        configuration: ConfigurationId,
        member: impl Into<Entity>,
    ) -> Result<(), ModelError> {
        self.configurations
            .get_mut(configuration)?
            .members
            .push(member.into());
        Ok(())
    }

    /// Create a parameter.
    pub fn create_parameter(&mut self, name: &str) -> Result<ParameterId, ModelError> {
        check_new_name(&self.parameter_names, EntityKind::Parameter, name)?;
        let id = self.parameters.push(Parameter {
            name: name.to_string(),
            values: Children::new(),
        });
        self.parameter_names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Create a value of `parameter`.
    pub fn create_parameter_value(
        &mut self,
        parameter: ParameterId,
        name: &str,
        value: Value,
    ) -> Result<ParameterValueId, ModelError> {
        let p = self.parameters.get(parameter)?;
        check_new_name(&p.values, EntityKind::ParameterValue, name)?;
        let id = self.parameter_values.push(ParameterValue {
            name: name.to_string(),
            parameter,
            value,
        });
        self.parameters
            .get_mut(parameter)?
            .values
            .insert(name.to_string(), id);
        Ok(id)
    }

    /// Select a parameter value in a configuration.
    ///
    /// A configuration holds at most one value per parameter.
    pub fn add_parameter_value(
        &mut self,
        configuration: ConfigurationId,
        value: ParameterValueId,
    ) -> Result<(), ModelError> {
        let parameter = self.parameter_values.get(value)?.parameter;
        let config = self.configurations.get(configuration)?;
        for &existing in &config.parameter_values {
            if self.parameter_values.get(existing)?.parameter == parameter {
                return Err(ModelError::DuplicateName {
                    kind: EntityKind::Parameter,
                    name: self.parameters.get(parameter)?.name.clone(),
                });
            }
        }
        self.configurations
            .get_mut(configuration)?
            .parameter_values
            .push(value);
        Ok(())
    }

    // ── Tensor types ────────────────────────────────────────────

    /// Register a tensor type, creating one [`TensorComponent`] per
    /// independent component in canonical order.
    pub fn create_tensor_type(
        &mut self,
        name: &str,
        shape: TensorShape,
    ) -> Result<TensorTypeId, ModelError> {
        check_new_name(&self.tensor_type_names, EntityKind::TensorType, name)?;
        let names: Vec<String> = (0..shape.component_count())
            .filter_map(|i| shape.component_name(i))
            .collect();
        let id = self.tensor_types.next_id();
        let mut components = Children::new();
        for (storage_index, cname) in names.into_iter().enumerate() {
            let cid = self.tensor_components.push(TensorComponent {
                name: cname.clone(),
                tensor_type: id,
                storage_index,
            });
            components.insert(cname, cid);
        }
        let pushed = self.tensor_types.push(TensorType {
            name: name.to_string(),
            shape,
            components,
        });
        self.tensor_type_names.insert(name.to_string(), pushed);
        Ok(pushed)
    }

    /// Register `Scalar{d}D`, `Vector{d}D`, `Tensor{d}D` and
    /// `SymmetricTensor{d}D` for `d` in 1..=3.
    ///
    /// Fails without registering anything if any of the names is taken.
    pub fn create_standard_tensor_types(&mut self) -> Result<Vec<TensorTypeId>, ModelError> {
        let mut pending = Vec::new();
        for d in STANDARD_DIMENSIONS {
            pending.push((format!("Scalar{d}D"), TensorShape::scalar(d)?));
            pending.push((format!("Vector{d}D"), TensorShape::vector(d)?));
            pending.push((format!("Tensor{d}D"), TensorShape::tensor(d)?));
            pending.push((
                format!("SymmetricTensor{d}D"),
                TensorShape::symmetric_tensor(d)?,
            ));
        }
        for (name, _) in &pending {
            check_new_name(&self.tensor_type_names, EntityKind::TensorType, name)?;
        }
        pending
            .into_iter()
            .map(|(name, shape)| self.create_tensor_type(&name, shape))
            .collect()
    }

    // ── Manifolds and discretizations ───────────────────────────

    /// Create a manifold of the given dimension.
    pub fn create_manifold(
        &mut self,
        name: &str,
        configuration: ConfigurationId,
        dimension: usize,
    ) -> Result<ManifoldId, ModelError> {
        check_new_name(&self.manifold_names, EntityKind::Manifold, name)?;
        self.configurations.get(configuration)?;
        let id = self.manifolds.push(Manifold {
            name: name.to_string(),
            configuration,
            dimension,
            discretizations: Children::new(),
            subdiscretizations: Children::new(),
            fields: Vec::new(),
            coordinate_systems: Vec::new(),
        });
        self.manifold_names.insert(name.to_string(), id);
        self.add_member(configuration, id)?;
        Ok(id)
    }

    /// Create a discretization of `manifold`.
    pub fn create_discretization(
        &mut self,
        manifold: ManifoldId,
        name: &str,
        configuration: ConfigurationId,
    ) -> Result<DiscretizationId, ModelError> {
        let m = self.manifolds.get(manifold)?;
        check_new_name(&m.discretizations, EntityKind::Discretization, name)?;
        self.configurations.get(configuration)?;
        let id = self.discretizations.push(Discretization {
            name: name.to_string(),
            manifold,
            configuration,
            blocks: Children::new(),
        });
        self.manifolds
            .get_mut(manifold)?
            .discretizations
            .insert(name.to_string(), id);
        self.add_member(configuration, id)?;
        Ok(id)
    }

    /// Create a block covering `[offset, offset + shape)`.
    ///
    /// Both vectors must have the manifold's dimension and `shape` must be
    /// non-negative. Blocks of one discretization may overlap or leave gaps.
    pub fn create_discretization_block(
        &mut self,
        discretization: DiscretizationId,
        name: &str,
        offset: &[i64],
        shape: &[i64],
    ) -> Result<DiscretizationBlockId, ModelError> {
        let d = self.discretizations.get(discretization)?;
        check_new_name(&d.blocks, EntityKind::DiscretizationBlock, name)?;
        let region = self.block_region(d.manifold, offset, shape)?;
        let id = self.blocks.push(DiscretizationBlock {
            name: name.to_string(),
            discretization,
            region,
            active: None,
            discrete_field_blocks: Vec::new(),
        });
        self.discretizations
            .get_mut(discretization)?
            .blocks
            .insert(name.to_string(), id);
        Ok(id)
    }

    fn block_region(
        &self,
        manifold: ManifoldId,
        offset: &[i64],
        shape: &[i64],
    ) -> Result<IndexBox, ModelError> {
        let dim = self.manifolds.get(manifold)?.dimension;
        check_dimension("block offset", dim, offset.len())?;
        check_dimension("block shape", dim, shape.len())?;
        Ok(IndexBox::new(offset, shape)?)
    }

    /// Whether any component on `block` has data attached.
    pub fn block_has_data(&self, block: DiscretizationBlockId) -> Result<bool, ModelError> {
        for &dfb in &self.blocks.get(block)?.discrete_field_blocks {
            for &c in self.discrete_field_blocks.get(dfb)?.components.values() {
                if self.components.get(c)?.data.is_attached() {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Move or resize a block.
    ///
    /// Fails with [`ModelError::RegionLocked`] once any component on the
    /// block has data attached.
    pub fn set_region(
        &mut self,
        block: DiscretizationBlockId,
        offset: &[i64],
        shape: &[i64],
    ) -> Result<(), ModelError> {
        let b = self.blocks.get(block)?;
        if self.block_has_data(block)? {
            return Err(ModelError::RegionLocked {
                block: b.name.clone(),
            });
        }
        let manifold = self.discretizations.get(b.discretization)?.manifold;
        let region = self.block_region(manifold, offset, shape)?;
        let b = self.blocks.get_mut(block)?;
        b.region = region;
        b.active = None;
        Ok(())
    }

    /// Mark the valid points of a block as a union of boxes within it.
    pub fn set_active_region(
        &mut self,
        block: DiscretizationBlockId,
        boxes: Vec<IndexBox>,
    ) -> Result<(), ModelError> {
        let b = self.blocks.get(block)?;
        for bx in &boxes {
            check_dimension("active region", b.region.dimension(), bx.dimension())?;
            if !b.region.contains_box(bx) {
                return Err(ModelError::OutsideRegion {
                    block: b.name.clone(),
                });
            }
        }
        self.blocks.get_mut(block)?.active = Some(boxes);
        Ok(())
    }

    /// Relate two discretizations of `manifold` by
    /// `parent = factor * child + offset`.
    pub fn create_subdiscretization(
        &mut self,
        manifold: ManifoldId,
        name: &str,
        parent: DiscretizationId,
        child: DiscretizationId,
        factor: &[f64],
        offset: &[f64],
    ) -> Result<SubDiscretizationId, ModelError> {
        let m = self.manifolds.get(manifold)?;
        check_new_name(&m.subdiscretizations, EntityKind::SubDiscretization, name)?;
        for (role, d) in [("parent", parent), ("child", child)] {
            if self.discretizations.get(d)?.manifold != manifold {
                return Err(mismatch(format!(
                    "{role} discretization is not on manifold '{}'",
                    m.name
                )));
            }
        }
        check_dimension("subdiscretization factor", m.dimension, factor.len())?;
        check_dimension("subdiscretization offset", m.dimension, offset.len())?;
        let id = self.subdiscretizations.push(SubDiscretization {
            name: name.to_string(),
            manifold,
            parent,
            child,
            factor: factor.to_vec(),
            offset: offset.to_vec(),
        });
        self.manifolds
            .get_mut(manifold)?
            .subdiscretizations
            .insert(name.to_string(), id);
        Ok(id)
    }

    // ── Tangent spaces and bases ────────────────────────────────

    /// Create a tangent space of the given dimension.
    pub fn create_tangent_space(
        &mut self,
        name: &str,
        configuration: ConfigurationId,
        dimension: usize,
    ) -> Result<TangentSpaceId, ModelError> {
        check_new_name(&self.tangent_space_names, EntityKind::TangentSpace, name)?;
        self.configurations.get(configuration)?;
        let id = self.tangent_spaces.push(TangentSpace {
            name: name.to_string(),
            configuration,
            dimension,
            bases: Children::new(),
        });
        self.tangent_space_names.insert(name.to_string(), id);
        self.add_member(configuration, id)?;
        Ok(id)
    }

    /// Create a basis of `tangent_space`.
    pub fn create_basis(
        &mut self,
        tangent_space: TangentSpaceId,
        name: &str,
        configuration: ConfigurationId,
    ) -> Result<BasisId, ModelError> {
        let ts = self.tangent_spaces.get(tangent_space)?;
        check_new_name(&ts.bases, EntityKind::Basis, name)?;
        self.configurations.get(configuration)?;
        let id = self.bases.push(Basis {
            name: name.to_string(),
            tangent_space,
            configuration,
            vectors: Children::new(),
        });
        self.tangent_spaces
            .get_mut(tangent_space)?
            .bases
            .insert(name.to_string(), id);
        self.add_member(configuration, id)?;
        Ok(id)
    }

    /// Add the basis vector for `direction`.
    pub fn create_basis_vector(
        &mut self,
        basis: BasisId,
        name: &str,
        direction: usize,
    ) -> Result<BasisVectorId, ModelError> {
        let b = self.bases.get(basis)?;
        check_new_name(&b.vectors, EntityKind::BasisVector, name)?;
        let dim = self.tangent_spaces.get(b.tangent_space)?.dimension;
        if direction >= dim {
            return Err(ModelError::IndexOutOfRange {
                index: direction,
                len: dim,
            });
        }
        for &v in b.vectors.values() {
            if self.basis_vectors.get(v)?.direction == direction {
                return Err(ModelError::DuplicateIndex { index: direction });
            }
        }
        let id = self.basis_vectors.push(BasisVector {
            name: name.to_string(),
            basis,
            direction,
        });
        self.bases
            .get_mut(basis)?
            .vectors
            .insert(name.to_string(), id);
        Ok(id)
    }

    // ── Fields ──────────────────────────────────────────────────

    /// Create a field over `manifold` with values of `tensor_type` in
    /// `tangent_space`. All three must have the same dimension.
    pub fn create_field(
        &mut self,
        name: &str,
        configuration: ConfigurationId,
        manifold: ManifoldId,
        tangent_space: TangentSpaceId,
        tensor_type: TensorTypeId,
    ) -> Result<FieldId, ModelError> {
        check_new_name(&self.field_names, EntityKind::Field, name)?;
        self.configurations.get(configuration)?;
        let dim = self.manifolds.get(manifold)?.dimension;
        let ts_dim = self.tangent_spaces.get(tangent_space)?.dimension;
        let tt_dim = self.tensor_types.get(tensor_type)?.shape.dimension();
        check_dimension("tangent space", dim, ts_dim)?;
        check_dimension("tensor type", dim, tt_dim)?;
        let id = self.fields.push(Field {
            name: name.to_string(),
            configuration,
            manifold,
            tangent_space,
            tensor_type,
            discrete_fields: Children::new(),
        });
        self.field_names.insert(name.to_string(), id);
        self.manifolds.get_mut(manifold)?.fields.push(id);
        self.add_member(configuration, id)?;
        Ok(id)
    }

    /// Instantiate `field` on a discretization of its manifold, in a
    /// complete basis of its tangent space.
    pub fn create_discrete_field(
        &mut self,
        field: FieldId,
        name: &str,
        configuration: ConfigurationId,
        discretization: DiscretizationId,
        basis: BasisId,
    ) -> Result<DiscreteFieldId, ModelError> {
        let f = self.fields.get(field)?;
        check_new_name(&f.discrete_fields, EntityKind::DiscreteField, name)?;
        self.configurations.get(configuration)?;
        if self.discretizations.get(discretization)?.manifold != f.manifold {
            return Err(mismatch(format!(
                "discretization is not on the manifold of field '{}'",
                f.name
            )));
        }
        let b = self.bases.get(basis)?;
        if b.tangent_space != f.tangent_space {
            return Err(mismatch(format!(
                "basis is not of the tangent space of field '{}'",
                f.name
            )));
        }
        let dim = self.tangent_spaces.get(f.tangent_space)?.dimension;
        check_dimension("basis vectors", dim, b.vector_count())?;
        let id = self.discrete_fields.push(DiscreteField {
            name: name.to_string(),
            field,
            configuration,
            discretization,
            basis,
            blocks: Children::new(),
        });
        self.fields
            .get_mut(field)?
            .discrete_fields
            .insert(name.to_string(), id);
        self.add_member(configuration, id)?;
        Ok(id)
    }

    /// Restrict a discrete field to one block of its discretization.
    pub fn create_discrete_field_block(
        &mut self,
        discrete_field: DiscreteFieldId,
        name: &str,
        block: DiscretizationBlockId,
    ) -> Result<DiscreteFieldBlockId, ModelError> {
        let df = self.discrete_fields.get(discrete_field)?;
        check_new_name(&df.blocks, EntityKind::DiscreteFieldBlock, name)?;
        let b = self.blocks.get(block)?;
        if b.discretization != df.discretization {
            return Err(mismatch(format!(
                "block '{}' is not part of the discretization of '{}'",
                b.name, df.name
            )));
        }
        let id = self.discrete_field_blocks.push(DiscreteFieldBlock {
            name: name.to_string(),
            discrete_field,
            block,
            components: Children::new(),
        });
        self.discrete_fields
            .get_mut(discrete_field)?
            .blocks
            .insert(name.to_string(), id);
        self.blocks.get_mut(block)?.discrete_field_blocks.push(id);
        Ok(id)
    }

    /// Tensor type of the field a discrete field block belongs to.
    pub(crate) fn block_tensor_type(
        &self,
        dfb: DiscreteFieldBlockId,
    ) -> Result<&TensorType, ModelError> {
        let df = self.discrete_field_blocks.get(dfb)?.discrete_field;
        let field = self.discrete_fields.get(df)?.field;
        self.tensor_types.get(self.fields.get(field)?.tensor_type)
    }

    /// Create the component holding tensor component `storage_index`.
    pub fn create_component(
        &mut self,
        dfb: DiscreteFieldBlockId,
        name: &str,
        storage_index: usize,
    ) -> Result<ComponentId, ModelError> {
        let block = self.discrete_field_blocks.get(dfb)?;
        check_new_name(&block.components, EntityKind::DiscreteFieldBlockComponent, name)?;
        let tt = self.block_tensor_type(dfb)?;
        let count = tt.component_count();
        if storage_index >= count {
            return Err(ModelError::IndexOutOfRange {
                index: storage_index,
                len: count,
            });
        }
        for &c in block.components.values() {
            if self.components.get(c)?.storage_index == storage_index {
                return Err(ModelError::DuplicateIndex {
                    index: storage_index,
                });
            }
        }
        let tensor_component = tt
            .components
            .get_index(storage_index)
            .map(|(_, &c)| c)
            .ok_or(ModelError::IndexOutOfRange {
                index: storage_index,
                len: count,
            })?;
        let id = self.components.push(Component {
            name: name.to_string(),
            discrete_field_block: dfb,
            tensor_component,
            storage_index,
            data: ComponentData::None,
        });
        self.discrete_field_blocks
            .get_mut(dfb)?
            .components
            .insert(name.to_string(), id);
        Ok(id)
    }

    /// Create every component the block is still missing, each named after
    /// its tensor component, in storage-index order.
    ///
    /// Returns the new handles. Fails without creating anything if one of
    /// the names is already used by a component of a different index.
    pub fn create_all_components(
        &mut self,
        dfb: DiscreteFieldBlockId,
    ) -> Result<Vec<ComponentId>, ModelError> {
        let block = self.discrete_field_blocks.get(dfb)?;
        let mut taken = Vec::new();
        for &c in block.components.values() {
            taken.push(self.components.get(c)?.storage_index);
        }
        let tt = self.block_tensor_type(dfb)?;
        let missing: Vec<(usize, String)> = tt
            .components
            .keys()
            .enumerate()
            .filter(|(i, _)| !taken.contains(i))
            .map(|(i, n)| (i, n.clone()))
            .collect();
        for (_, name) in &missing {
            check_new_name(
                &block.components,
                EntityKind::DiscreteFieldBlockComponent,
                name,
            )?;
        }
        missing
            .into_iter()
            .map(|(i, name)| self.create_component(dfb, &name, i))
            .collect()
    }

    // ── Coordinate systems ──────────────────────────────────────

    /// Create a coordinate system for `manifold`.
    pub fn create_coordinate_system(
        &mut self,
        name: &str,
        configuration: ConfigurationId,
        manifold: ManifoldId,
    ) -> Result<CoordinateSystemId, ModelError> {
        check_new_name(
            &self.coordinate_system_names,
            EntityKind::CoordinateSystem,
            name,
        )?;
        self.configurations.get(configuration)?;
        self.manifolds.get(manifold)?;
        let id = self.coordinate_systems.push(CoordinateSystem {
            name: name.to_string(),
            configuration,
            manifold,
            fields: Children::new(),
        });
        self.coordinate_system_names.insert(name.to_string(), id);
        self.manifolds.get_mut(manifold)?.coordinate_systems.push(id);
        self.add_member(configuration, id)?;
        Ok(id)
    }

    /// Bind coordinate `direction` to `field`, which must live on the
    /// coordinate system's manifold.
    pub fn create_coordinate_field(
        &mut self,
        coordinate_system: CoordinateSystemId,
        name: &str,
        direction: usize,
        field: FieldId,
    ) -> Result<CoordinateFieldId, ModelError> {
        let cs = self.coordinate_systems.get(coordinate_system)?;
        check_new_name(&cs.fields, EntityKind::CoordinateField, name)?;
        let dim = self.manifolds.get(cs.manifold)?.dimension;
        if direction >= dim {
            return Err(ModelError::IndexOutOfRange {
                index: direction,
                len: dim,
            });
        }
        let f = self.fields.get(field)?;
        if f.manifold != cs.manifold {
            return Err(mismatch(format!(
                "field '{}' is not on the manifold of coordinate system '{}'",
                f.name, cs.name
            )));
        }
        for &c in cs.fields.values() {
            if self.coordinate_fields.get(c)?.direction == direction {
                return Err(ModelError::DuplicateIndex { index: direction });
            }
        }
        let id = self.coordinate_fields.push(CoordinateField {
            name: name.to_string(),
            coordinate_system,
            direction,
            field,
        });
        self.coordinate_systems
            .get_mut(coordinate_system)?
            .fields
            .insert(name.to_string(), id);
        Ok(id)
    }
}
