//! Clone Engine
//!
//! Deep copies for strings, buffers and packages; shallow copies for
//! everything else. The copy is always fully built before the destination
//! lets go of its old value, which is what makes copy-to-self safe.

use crate::error::AmlResult;

use super::context::ObjectContext;
use super::variable::Variable;

impl ObjectContext {
    /// Independent copy of `source`.
    ///
    /// Packages are copied element by element, recursing into nested
    /// packages. Integers, handles and lazy handles come back as shallow copies.
    pub fn deep_clone(&self, source: &Variable) -> AmlResult<Variable> {
        match source {
            Variable::String(src) => {
                let src = src.borrow();
                let n = src.len();
                let payload = self.new_string(n)?;
                payload.borrow_mut().content[..n].copy_from_slice(src.as_bytes());
                Ok(Variable::String(payload))
            }
            Variable::Buffer(src) => {
                let src = src.borrow();
                let payload = self.new_buffer(src.size())?;
                payload.borrow_mut().content.copy_from_slice(src.as_bytes());
                Ok(Variable::Buffer(payload))
            }
            Variable::Package(src) => {
                let src = src.borrow();
                let payload = self.new_package(src.size())?;
                {
                    let mut dest = payload.borrow_mut();
                    for (slot, elem) in dest.elems.iter_mut().zip(src.elements()) {
                        *slot = self.deep_clone(elem)?;
                    }
                }
                Ok(Variable::Package(payload))
            }
            other => Ok(other.clone()),
        }
    }

    /// Store a copy of `source` into `dest`.
    ///
    /// On failure `dest` is unchanged.
    pub fn clone_into(&self, dest: &mut Variable, source: &Variable) -> AmlResult<()> {
        let mut temp = self.deep_clone(source)?;
        dest.swap(&mut temp);
        // `temp` now owns the old destination value.
        temp.finalize();
        Ok(())
    }

    /// Copy `object` onto itself, detaching it from any variables that
    /// shared its payload.
    pub fn clone_in_place(&self, object: &mut Variable) -> AmlResult<()> {
        let mut temp = self.deep_clone(object)?;
        object.swap(&mut temp);
        temp.finalize();
        Ok(())
    }
}
